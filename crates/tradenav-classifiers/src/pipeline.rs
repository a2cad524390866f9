//! The HS code classification cascade
//!
//! Tiers are evaluated in order and the first one that produces a result
//! wins:
//! - Remote model (skipped for trivial descriptions)
//! - Static mapping (recognized categories only)
//! - Terminal fallback (always succeeds)
//!
//! `classify` never fails; every problem degrades to a lower tier.

use crate::classifier::{is_trivial_description, ClassificationContext, ClassificationStrategy};
use crate::config::ClassifierConfig;
use crate::fallback::FallbackStrategy;
use crate::remote::{HttpRemoteClassifier, RemoteClassifier, RemoteModelStrategy};
use crate::static_mapping::StaticMappingStrategy;
use crate::tables::ReferenceTables;
use crate::terminology::TerminologyMatcher;
use crate::validation::{validate_code, CodeValidation};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};
use tradenav_core::{ClassificationRequest, ClassificationResult, Result};

/// Ordered tiers ending in a terminal fallback
pub struct HsCodeClassifier {
    tables: Arc<ReferenceTables>,
    terminology: TerminologyMatcher,
    strategies: Vec<Arc<dyn ClassificationStrategy>>,
    terminal: FallbackStrategy,
    min_description_len: usize,
}

/// Result of one cascade run with the tiers that were consulted
#[derive(Debug, Clone)]
pub struct CascadeExecution {
    /// The winning result
    pub result: ClassificationResult,

    /// Names of tiers attempted, in order, including the winner
    pub attempted: Vec<String>,

    /// Total execution time
    pub latency_us: u64,
}

impl HsCodeClassifier {
    /// Start building a cascade over the given tables
    pub fn builder(tables: Arc<ReferenceTables>) -> CascadeBuilder {
        CascadeBuilder::new(tables)
    }

    /// Build the cascade described by `config`
    ///
    /// Loads tables from `tables_path` when set, otherwise uses the built-in
    /// tables. The remote tier is only added when an endpoint is configured.
    pub fn from_config(config: &ClassifierConfig) -> Result<Self> {
        let tables = match &config.tables_path {
            Some(path) => ReferenceTables::from_yaml_file(path)?,
            None => ReferenceTables::builtin(),
        };

        let mut builder = Self::builder(Arc::new(tables))
            .min_description_len(config.min_description_len);

        if let Some(endpoint) = config.remote.endpoint() {
            info!(
                "Remote classifier enabled: {} (timeout {}ms)",
                endpoint, config.remote.timeout_ms
            );
            let remote = HttpRemoteClassifier::new(endpoint, config.remote.timeout())?;
            builder = builder.remote(Arc::new(remote));
        } else {
            info!("No remote classifier configured, using local tiers only");
        }

        builder.build()
    }

    /// Suggest an HS code for a product
    pub async fn classify(&self, description: &str, category: &str) -> ClassificationResult {
        self.execute(description, category).await.result
    }

    /// Suggest an HS code for a request
    pub async fn classify_request(&self, request: &ClassificationRequest) -> ClassificationResult {
        self.classify(&request.description, &request.category).await
    }

    /// Run the cascade and report which tiers were consulted
    pub async fn execute(&self, description: &str, category: &str) -> CascadeExecution {
        let start = Instant::now();
        let ctx = self.context(description, category);
        let mut attempted = Vec::new();

        let mut outcome = None;
        for strategy in &self.strategies {
            if ctx.trivial && strategy.requires_description() {
                debug!("Skipping {} tier for trivial description", strategy.name());
                continue;
            }

            attempted.push(strategy.name().to_string());
            if let Some(result) = strategy.attempt(&ctx).await {
                outcome = Some(result);
                break;
            }
            debug!("Tier {} declined", strategy.name());
        }

        let result = outcome.unwrap_or_else(|| {
            attempted.push("fallback".to_string());
            self.terminal.resolve()
        });

        let latency_us = start.elapsed().as_micros() as u64;
        debug!(
            hs_code = %result.hs_code,
            confidence = result.confidence,
            source = %result.source,
            latency_us,
            "Classification complete"
        );
        metrics::counter!("tradenav_classifications_total", "source" => result.source.as_str())
            .increment(1);
        metrics::histogram!("tradenav_classify_latency_us").record(latency_us as f64);

        CascadeExecution {
            result,
            attempted,
            latency_us,
        }
    }

    /// Build the per-request context: category recognition, triviality,
    /// and the terminology pre-scan
    pub fn context(&self, description: &str, category: &str) -> ClassificationContext {
        let recognized = self.tables.is_recognized(category);
        let terms = if recognized {
            self.terminology.detect(category, description)
        } else {
            Vec::new()
        };

        ClassificationContext::new(description, category, recognized)
            .with_detected_terms(terms)
            .with_trivial(is_trivial_description(description, self.min_description_len))
    }

    /// Check a code against a category's expected chapters
    pub fn validate_code(&self, code: &str, category: &str) -> CodeValidation {
        validate_code(&self.tables, code, category)
    }

    pub fn tables(&self) -> &ReferenceTables {
        &self.tables
    }

    /// Names of the non-terminal tiers in evaluation order
    pub fn tier_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }
}

/// Builder for the classification cascade
pub struct CascadeBuilder {
    tables: Arc<ReferenceTables>,
    remote: Option<Arc<dyn RemoteClassifier>>,
    terminal: FallbackStrategy,
    min_description_len: usize,
}

impl CascadeBuilder {
    pub fn new(tables: Arc<ReferenceTables>) -> Self {
        Self {
            tables,
            remote: None,
            terminal: FallbackStrategy::default(),
            min_description_len: ClassifierConfig::default().min_description_len,
        }
    }

    /// Use a remote classification service as the first tier
    pub fn remote(mut self, remote: Arc<dyn RemoteClassifier>) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Replace the terminal fallback
    pub fn fallback(mut self, terminal: FallbackStrategy) -> Self {
        self.terminal = terminal;
        self
    }

    pub fn min_description_len(mut self, len: usize) -> Self {
        self.min_description_len = len;
        self
    }

    /// Build the cascade
    pub fn build(self) -> Result<HsCodeClassifier> {
        let terminology = TerminologyMatcher::new(&self.tables)?;

        let mut strategies: Vec<Arc<dyn ClassificationStrategy>> = Vec::new();
        if let Some(remote) = self.remote {
            strategies.push(Arc::new(RemoteModelStrategy::new(remote, Arc::clone(&self.tables))));
        }
        strategies.push(Arc::new(StaticMappingStrategy::new(Arc::clone(&self.tables))));

        debug!(
            "Built classification cascade with {} tiers over {} categories",
            strategies.len() + 1,
            self.tables.len()
        );

        Ok(HsCodeClassifier {
            tables: self.tables,
            terminology,
            strategies,
            terminal: self.terminal,
            min_description_len: self.min_description_len,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::{RemoteRequest, RemoteResponse};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tradenav_core::{ClassificationSource, Error};

    /// Remote that records requests and replays a fixed outcome
    struct RecordingRemote {
        response: Option<RemoteResponse>,
        requests: Mutex<Vec<RemoteRequest>>,
    }

    impl RecordingRemote {
        fn new(response: Option<RemoteResponse>) -> Self {
            Self {
                response,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<RemoteRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RemoteClassifier for RecordingRemote {
        async fn classify(&self, request: &RemoteRequest) -> Result<RemoteResponse> {
            self.requests.lock().unwrap().push(request.clone());
            self.response.clone().ok_or_else(|| Error::remote("connection refused"))
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    fn classifier_with(remote: Arc<RecordingRemote>) -> HsCodeClassifier {
        HsCodeClassifier::builder(Arc::new(ReferenceTables::builtin()))
            .remote(remote)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_remote_receives_detected_terms() {
        let remote = Arc::new(RecordingRemote::new(Some(
            RemoteResponse::success("7326.90.00").with_confidence(0.9),
        )));
        let classifier = classifier_with(Arc::clone(&remote));

        let execution = classifier
            .execute("steel alloy bracket", "Metals & Metal Products")
            .await;

        assert_eq!(execution.result.source, ClassificationSource::RemoteModel);
        assert_eq!(execution.attempted, vec!["remote_model"]);

        let requests = remote.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].detected_terms, vec!["alloy", "steel"]);
        assert_eq!(requests[0].category, "Metals & Metal Products");
    }

    #[tokio::test]
    async fn test_tier_order_on_failure() {
        let remote = Arc::new(RecordingRemote::new(None));
        let classifier = classifier_with(Arc::clone(&remote));

        let execution = classifier.execute("wireless mouse", "Electronics").await;
        assert_eq!(execution.attempted, vec!["remote_model", "static_mapping"]);
        assert_eq!(execution.result.source, ClassificationSource::StaticMapping);

        let execution = classifier.execute("wireless mouse", "Unobtainium").await;
        assert_eq!(execution.attempted, vec!["remote_model", "static_mapping", "fallback"]);
        assert_eq!(execution.result.source, ClassificationSource::Fallback);
    }

    #[tokio::test]
    async fn test_source_matches_winning_tier() {
        let succeeding = classifier_with(Arc::new(RecordingRemote::new(Some(
            RemoteResponse::success("8471.30.00"),
        ))));
        let failing = classifier_with(Arc::new(RecordingRemote::new(None)));
        assert_eq!(succeeding.tier_names(), vec!["remote_model", "static_mapping"]);

        let cases = [
            (&succeeding, "mystery widget", "Unobtainium", ClassificationSource::RemoteModel),
            (&succeeding, "tv", "Electronics", ClassificationSource::StaticMapping),
            (&succeeding, "", "Unobtainium", ClassificationSource::Fallback),
            (&failing, "mystery widget", "Unobtainium", ClassificationSource::Fallback),
            (&failing, "wireless mouse", "Electronics", ClassificationSource::StaticMapping),
        ];

        for (classifier, description, category, expected) in cases {
            let execution = classifier.execute(description, category).await;
            assert_eq!(execution.result.source, expected, "{:?}/{:?}", description, category);
            assert_eq!(
                execution.attempted.last().map(String::as_str),
                Some(expected.as_str()),
                "{:?}/{:?}",
                description,
                category
            );
        }
    }

    #[tokio::test]
    async fn test_trivial_description_skips_remote() {
        let remote = Arc::new(RecordingRemote::new(Some(RemoteResponse::success("8471.30.00"))));
        let classifier = classifier_with(Arc::clone(&remote));

        let execution = classifier.execute(" tv ", "Electronics").await;
        assert_eq!(execution.attempted, vec!["static_mapping"]);
        assert!(remote.requests().is_empty());
    }

    #[tokio::test]
    async fn test_no_remote_configured() {
        let classifier = HsCodeClassifier::from_config(&ClassifierConfig::default()).unwrap();
        assert_eq!(classifier.tier_names(), vec!["static_mapping"]);

        let result = classifier.classify("cotton t-shirt", "Textiles & Apparel").await;
        assert_eq!(result.hs_code, "6109.10.00");
        assert_eq!(result.source, ClassificationSource::StaticMapping);
    }

    #[tokio::test]
    async fn test_custom_fallback() {
        let classifier = HsCodeClassifier::builder(Arc::new(ReferenceTables::empty()))
            .fallback(FallbackStrategy::new("9999.99.00", 0.1, "Unclassified goods"))
            .build()
            .unwrap();

        let result = classifier.classify("anything at all", "Electronics").await;
        assert_eq!(result.hs_code, "9999.99.00");
        assert_eq!(result.source, ClassificationSource::Fallback);
    }

    #[test]
    fn test_context() {
        let classifier = HsCodeClassifier::builder(Arc::new(ReferenceTables::builtin()))
            .min_description_len(5)
            .build()
            .unwrap();

        let ctx = classifier.context("soap", "Cosmetics & Personal Care");
        assert!(ctx.category_recognized);
        assert!(ctx.trivial);
        assert_eq!(ctx.detected_terms, vec!["soap"]);

        let ctx = classifier.context("steel alloy bracket", "Unobtainium");
        assert!(!ctx.category_recognized);
        assert!(!ctx.trivial);
        assert!(ctx.detected_terms.is_empty());
    }
}
