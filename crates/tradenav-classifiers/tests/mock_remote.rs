//! Cascade tests against mock remote classifiers
//!
//! Provides configurable mock implementations of the RemoteClassifier trait
//! for testing tier ordering, confidence reconciliation, and degradation.

use async_trait::async_trait;
use proptest::prelude::*;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tradenav_classifiers::{
    HsCodeClassifier, ReferenceTables, RemoteClassifier, RemoteRequest, RemoteResponse,
};
use tradenav_core::{ClassificationResult, ClassificationSource, Result};

/// A remote that replays a fixed response and counts calls
pub struct MockRemote {
    response: RemoteResponse,
    simulated_latency: Option<Duration>,
    call_count: AtomicU32,
}

impl MockRemote {
    pub fn new(response: RemoteResponse) -> Self {
        Self {
            response,
            simulated_latency: None,
            call_count: AtomicU32::new(0),
        }
    }

    /// Set simulated latency for this remote
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.simulated_latency = Some(latency);
        self
    }

    /// Get the number of times classify was called
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl RemoteClassifier for MockRemote {
    async fn classify(&self, _request: &RemoteRequest) -> Result<RemoteResponse> {
        self.call_count.fetch_add(1, Ordering::Relaxed);

        if let Some(latency) = self.simulated_latency {
            tokio::time::sleep(latency).await;
        }

        Ok(self.response.clone())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// A remote that always fails - for testing degradation
pub struct FailingRemote {
    call_count: AtomicU32,
}

impl FailingRemote {
    pub fn new() -> Self {
        Self {
            call_count: AtomicU32::new(0),
        }
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl RemoteClassifier for FailingRemote {
    async fn classify(&self, _request: &RemoteRequest) -> Result<RemoteResponse> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        Err(tradenav_core::Error::Timeout)
    }

    fn name(&self) -> &str {
        "failing"
    }
}

fn cascade(remote: Arc<dyn RemoteClassifier>) -> HsCodeClassifier {
    HsCodeClassifier::builder(Arc::new(ReferenceTables::builtin()))
        .remote(remote)
        .build()
        .unwrap()
}

fn assert_well_formed(result: &ClassificationResult) {
    assert!(!result.hs_code.trim().is_empty());
    assert!((0.0..=1.0).contains(&result.confidence));
    assert!(!result.alternative_codes.contains(&result.hs_code));
}

#[tokio::test]
async fn test_failing_remote_degrades_to_static_mapping() {
    let remote = Arc::new(FailingRemote::new());
    let classifier = cascade(remote.clone());

    let result = classifier.classify("13 inch ultrabook", "Electronics").await;

    assert_eq!(remote.call_count(), 1);
    assert_eq!(result.source, ClassificationSource::StaticMapping);
    assert_eq!(result.confidence, 0.85);
    assert_eq!(result.hs_code, "8471.30.00");
    assert_eq!(result.alternative_codes.len(), 3);
}

#[tokio::test]
async fn test_failing_remote_unrecognized_category_falls_back() {
    let classifier = cascade(Arc::new(FailingRemote::new()));

    let result = classifier.classify("quantum flux capacitor", "Unobtainium").await;

    assert_eq!(result.source, ClassificationSource::Fallback);
    assert_eq!(result.hs_code, "8471.30.00");
    assert_eq!(result.confidence, 0.6);
    assert!(!result.alternative_codes.is_empty());
}

#[tokio::test]
async fn test_short_description_never_calls_remote() {
    let remote = Arc::new(MockRemote::new(RemoteResponse::success("8517.13.00")));
    let classifier = cascade(remote.clone());

    for description in ["", "  ", "ab", " x ", "\tab\n"] {
        let result = classifier.classify(description, "Electronics").await;
        assert_eq!(result.source, ClassificationSource::StaticMapping);

        let result = classifier.classify(description, "Unobtainium").await;
        assert_eq!(result.source, ClassificationSource::Fallback);
    }

    assert_eq!(remote.call_count(), 0);

    classifier.classify("abc", "Electronics").await;
    assert_eq!(remote.call_count(), 1);
}

#[tokio::test]
async fn test_confidence_discounted_outside_expected_chapters() {
    let remote = Arc::new(MockRemote::new(
        RemoteResponse::success("6109.10.00").with_confidence(0.8),
    ));
    let result = cascade(remote).classify("smart watch strap", "Electronics").await;

    assert_eq!(result.source, ClassificationSource::RemoteModel);
    assert!((result.confidence - 0.56).abs() < 1e-9);
}

#[tokio::test]
async fn test_confidence_kept_inside_expected_chapters() {
    let remote = Arc::new(MockRemote::new(
        RemoteResponse::success("8517.13.00").with_confidence(0.8),
    ));
    let result = cascade(remote).classify("android smartphone", "Electronics").await;

    assert_eq!(result.source, ClassificationSource::RemoteModel);
    assert!((result.confidence - 0.8).abs() < 1e-9);
}

#[tokio::test]
async fn test_unsuccessful_remote_response_degrades() {
    let mut response = RemoteResponse::success("8517.13.00");
    response.success = Some(false);
    let remote = Arc::new(MockRemote::new(response));
    let classifier = cascade(remote.clone());

    let result = classifier.classify("android smartphone", "Electronics").await;
    assert_eq!(remote.call_count(), 1);
    assert_eq!(result.source, ClassificationSource::StaticMapping);

    let remote = Arc::new(MockRemote::new(RemoteResponse::success("")));
    let result = cascade(remote).classify("android smartphone", "Electronics").await;
    assert_eq!(result.source, ClassificationSource::StaticMapping);
}

#[tokio::test]
async fn test_remote_alternates_exclude_primary() {
    let remote = Arc::new(MockRemote::new(
        RemoteResponse::success("8517.13.00")
            .with_confidence(0.9)
            .with_alternatives(vec![
                "8517.13.00".to_string(),
                "8517.14.00".to_string(),
                "8517.62.00".to_string(),
            ]),
    ));
    let result = cascade(remote).classify("android smartphone", "Electronics").await;

    assert_eq!(result.hs_code, "8517.13.00");
    assert_eq!(result.alternative_codes, vec!["8517.14.00", "8517.62.00"]);
    assert_eq!(result.explanations.len(), 3);
    assert_well_formed(&result);
}

#[tokio::test]
async fn test_steel_bracket_scenario() {
    let classifier = cascade(Arc::new(FailingRemote::new()));

    let ctx = classifier.context("steel alloy bracket", "Metals & Metal Products");
    assert_eq!(ctx.detected_terms, vec!["alloy", "steel"]);

    let result = classifier
        .classify("steel alloy bracket", "Metals & Metal Products")
        .await;

    assert_eq!(result.source, ClassificationSource::StaticMapping);
    assert_eq!(result.confidence, 0.85);
    assert_eq!(result.hs_code, "7326.90.00");
}

#[tokio::test(start_paused = true)]
async fn test_slow_remote_still_answers() {
    let remote = Arc::new(
        MockRemote::new(RemoteResponse::success("8471.30.00")).with_latency(Duration::from_secs(2)),
    );
    let result = cascade(remote.clone()).classify("gaming laptop", "Electronics").await;

    assert_eq!(remote.call_count(), 1);
    assert_eq!(result.source, ClassificationSource::RemoteModel);
}

#[tokio::test]
async fn test_concurrent_classification() {
    let classifier = Arc::new(cascade(Arc::new(FailingRemote::new())));

    let handles: Vec<_> = ["Electronics", "Furniture", "Unobtainium", "Chemicals"]
        .into_iter()
        .map(|category| {
            let classifier = Arc::clone(&classifier);
            tokio::spawn(async move { classifier.classify("sample product", category).await })
        })
        .collect();

    for handle in handles {
        assert_well_formed(&handle.await.unwrap());
    }
}

fn category_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Electronics".to_string()),
        Just("Metals & Metal Products".to_string()),
        Just("Toys & Games".to_string()),
        Just(String::new()),
        "[A-Za-z &]{0,24}",
    ]
}

proptest! {
    #[test]
    fn prop_classify_is_total(description in ".{0,64}", category in category_strategy()) {
        let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
        let classifier = cascade(Arc::new(FailingRemote::new()));

        let result = rt.block_on(classifier.classify(&description, &category));

        prop_assert!(!result.hs_code.trim().is_empty());
        prop_assert!((0.0..=1.0).contains(&result.confidence));
        prop_assert!(!result.alternative_codes.contains(&result.hs_code));
        prop_assert_ne!(result.source, ClassificationSource::RemoteModel);
    }

    #[test]
    fn prop_remote_confidence_stays_in_bounds(
        code in "[0-9]{4}\\.[0-9]{2}\\.[0-9]{2}",
        confidence in proptest::num::f64::ANY,
        category in category_strategy(),
    ) {
        let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
        let remote = Arc::new(MockRemote::new(
            RemoteResponse::success(code.clone()).with_confidence(confidence),
        ));

        let result = rt.block_on(cascade(remote).classify("a product description", &category));

        prop_assert_eq!(result.source, ClassificationSource::RemoteModel);
        prop_assert_eq!(result.hs_code, code);
        prop_assert!((0.0..=1.0).contains(&result.confidence));
    }
}
