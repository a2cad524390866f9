//! Remote classification tier
//!
//! Sends `{description, category, detectedTerms}` to an external
//! classification service and reconciles the returned code against the
//! category's expected chapters. Any transport or payload problem makes the
//! tier decline so the cascade falls through to the local tiers.

use crate::classifier::{ClassificationContext, ClassificationStrategy};
use crate::tables::ReferenceTables;
use crate::validation::validation_confidence;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use tradenav_core::{
    clamp_confidence, dedup_alternatives, ClassificationResult, ClassificationSource, Error,
    Result,
};

/// Confidence assumed when the remote service does not report one
pub const DEFAULT_REMOTE_CONFIDENCE: f64 = 0.8;

/// Alternatives that get a synthesized explanation
const MAX_EXPLAINED_ALTERNATIVES: usize = 3;

/// Detected terms quoted in the primary explanation
const MAX_EXPLAINED_TERMS: usize = 2;

/// Largest response body accepted from the remote service
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 1024 * 1024;

/// Request body sent to the remote service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteRequest {
    pub description: String,
    pub category: String,
    pub detected_terms: Vec<String>,
}

impl From<&ClassificationContext> for RemoteRequest {
    fn from(ctx: &ClassificationContext) -> Self {
        Self {
            description: ctx.description.clone(),
            category: ctx.category.clone(),
            detected_terms: ctx.detected_terms.clone(),
        }
    }
}

/// Response body returned by the remote service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub hs_code: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub alternative_codes: Option<Vec<String>>,
    #[serde(default)]
    pub explanations: Option<Vec<String>>,
}

impl RemoteResponse {
    /// A successful response with just a code
    pub fn success(hs_code: impl Into<String>) -> Self {
        Self {
            success: Some(true),
            hs_code: Some(hs_code.into()),
            ..Self::default()
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_alternatives(mut self, codes: Vec<String>) -> Self {
        self.alternative_codes = Some(codes);
        self
    }

    pub fn with_explanations(mut self, explanations: Vec<String>) -> Self {
        self.explanations = Some(explanations);
        self
    }

    /// The trimmed primary code if the response is usable
    fn usable_code(&self) -> Option<&str> {
        if self.success != Some(true) {
            return None;
        }
        self.hs_code
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

/// Transport to a remote classification service
#[async_trait]
pub trait RemoteClassifier: Send + Sync {
    /// Send one classification request
    async fn classify(&self, request: &RemoteRequest) -> Result<RemoteResponse>;

    /// Get the remote name (for logs)
    fn name(&self) -> &str;
}

/// JSON-over-HTTP remote classifier
pub struct HttpRemoteClassifier {
    endpoint: String,
    client: reqwest::Client,
    max_response_bytes: usize,
}

impl HttpRemoteClassifier {
    /// Create a client for `endpoint` with a bounded request timeout
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self::with_client(endpoint, client))
    }

    /// Use an existing client
    pub fn with_client(endpoint: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            endpoint: endpoint.into(),
            client,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
        }
    }

    /// Override the response body size limit
    pub fn with_max_response_bytes(mut self, limit: usize) -> Self {
        self.max_response_bytes = limit;
        self
    }

    /// Read the body, failing once it grows past the limit
    async fn read_body(&self, mut response: reqwest::Response) -> Result<Vec<u8>> {
        let limit = self.max_response_bytes;
        if let Some(len) = response.content_length() {
            if len > limit as u64 {
                return Err(oversized(len, limit));
            }
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(transport_error)? {
            if body.len() + chunk.len() > limit {
                return Err(oversized((body.len() + chunk.len()) as u64, limit));
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }
}

#[async_trait]
impl RemoteClassifier for HttpRemoteClassifier {
    async fn classify(&self, request: &RemoteRequest) -> Result<RemoteResponse> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::remote(format!("unexpected status {}", status)));
        }

        let body = self.read_body(response).await?;
        let parsed = serde_json::from_slice(&body)?;
        Ok(parsed)
    }

    fn name(&self) -> &str {
        "http"
    }
}

fn oversized(len: u64, limit: usize) -> Error {
    Error::remote(format!(
        "response body of at least {} bytes exceeds the {} byte limit",
        len, limit
    ))
}

fn transport_error(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout
    } else {
        Error::remote(e.to_string())
    }
}

/// The remote tier of the cascade
pub struct RemoteModelStrategy {
    remote: Arc<dyn RemoteClassifier>,
    tables: Arc<ReferenceTables>,
}

impl RemoteModelStrategy {
    pub fn new(remote: Arc<dyn RemoteClassifier>, tables: Arc<ReferenceTables>) -> Self {
        Self { remote, tables }
    }
}

#[async_trait]
impl ClassificationStrategy for RemoteModelStrategy {
    async fn attempt(&self, ctx: &ClassificationContext) -> Option<ClassificationResult> {
        let request = RemoteRequest::from(ctx);

        let response = match self.remote.classify(&request).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Remote classifier '{}' failed: {}", self.remote.name(), e);
                metrics::counter!("tradenav_remote_failures_total", "reason" => e.kind())
                    .increment(1);
                return None;
            }
        };

        let result = reconcile(&self.tables, ctx, response);
        if result.is_none() {
            debug!("Remote classifier returned no usable code");
            metrics::counter!("tradenav_remote_failures_total", "reason" => "unusable_response")
                .increment(1);
        }
        result
    }

    fn name(&self) -> &str {
        "remote_model"
    }

    fn requires_description(&self) -> bool {
        true
    }
}

/// Turn a remote response into a result, or `None` if it is unusable
///
/// Confidence is the remote confidence (default 0.8) scaled by the chapter
/// validation factor and clamped to `[0, 1]`.
///
/// Remote explanations are kept verbatim. If the remote repeated the primary
/// or duplicated an alternative, they may no longer line up one-to-one with
/// the de-duplicated `[primary, ...alternatives]`; that is accepted.
pub fn reconcile(
    tables: &ReferenceTables,
    ctx: &ClassificationContext,
    response: RemoteResponse,
) -> Option<ClassificationResult> {
    let hs_code = response.usable_code()?.to_string();

    let remote_confidence = match response.confidence {
        Some(c) if c.is_finite() => clamp_confidence(c),
        _ => DEFAULT_REMOTE_CONFIDENCE,
    };
    let factor = validation_confidence(tables, &hs_code, &ctx.category);
    let confidence = (remote_confidence * factor).min(1.0);

    debug!(
        hs_code = %hs_code,
        remote_confidence,
        factor,
        "Reconciled remote classification"
    );

    let alternatives = dedup_alternatives(&hs_code, response.alternative_codes.unwrap_or_default());

    let explanations = match response.explanations {
        Some(explanations) if !explanations.is_empty() => explanations,
        _ => synthesize_explanations(ctx, &alternatives),
    };

    let mut result = ClassificationResult::new(hs_code, confidence, ClassificationSource::RemoteModel)
        .with_explanations(explanations);
    result.alternative_codes = alternatives;
    result.description = response
        .description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());

    Some(result)
}

/// Explanations for the primary code and the first few alternatives
fn synthesize_explanations(ctx: &ClassificationContext, alternatives: &[String]) -> Vec<String> {
    let primary = if !ctx.detected_terms.is_empty() {
        let terms: Vec<&str> = ctx
            .detected_terms
            .iter()
            .take(MAX_EXPLAINED_TERMS)
            .map(String::as_str)
            .collect();
        format!("Matched based on detected terms: {}", terms.join(", "))
    } else if ctx.category_recognized {
        format!("Selected based on {} category classification", ctx.category)
    } else {
        "Selected based on product description analysis".to_string()
    };

    let alternative = if ctx.category_recognized {
        format!("Alternative classification within {} category", ctx.category)
    } else {
        "Alternative classification based on product description".to_string()
    };

    std::iter::once(primary)
        .chain(
            alternatives
                .iter()
                .take(MAX_EXPLAINED_ALTERNATIVES)
                .map(|_| alternative.clone()),
        )
        .collect()
}
