//! Terminal fallback tier

use tradenav_core::{ClassificationResult, ClassificationSource};

/// Code returned when every other tier declines
pub const FALLBACK_CODE: &str = "8471.30.00";

/// Confidence of the terminal fallback
pub const FALLBACK_CONFIDENCE: f64 = 0.6;

const FALLBACK_DESCRIPTION: &str =
    "Portable automatic data processing machines, weighing not more than 10 kg";

const FALLBACK_ALTERNATIVES: &[&str] = &["8471.41.00", "8471.49.00", "8471.50.00"];

const FALLBACK_EXPLANATION: &str =
    "Generic fallback classification; verify the code with a customs broker";

/// The end of the cascade: always produces a result
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackStrategy {
    hs_code: String,
    confidence: f64,
    description: String,
    alternatives: Vec<String>,
}

impl FallbackStrategy {
    /// A custom terminal result
    ///
    /// An empty `hs_code` is replaced by [`FALLBACK_CODE`].
    pub fn new(hs_code: impl Into<String>, confidence: f64, description: impl Into<String>) -> Self {
        let hs_code = hs_code.into().trim().to_string();
        Self {
            hs_code: if hs_code.is_empty() {
                FALLBACK_CODE.to_string()
            } else {
                hs_code
            },
            confidence,
            description: description.into(),
            alternatives: Vec::new(),
        }
    }

    pub fn with_alternatives(mut self, alternatives: Vec<String>) -> Self {
        self.alternatives = alternatives;
        self
    }

    /// Build the terminal result
    pub fn resolve(&self) -> ClassificationResult {
        ClassificationResult::new(
            self.hs_code.clone(),
            self.confidence,
            ClassificationSource::Fallback,
        )
        .with_description(self.description.clone())
        .with_alternatives(&self.alternatives)
        .with_explanations(vec![FALLBACK_EXPLANATION.to_string()])
    }
}

impl Default for FallbackStrategy {
    fn default() -> Self {
        Self::new(FALLBACK_CODE, FALLBACK_CONFIDENCE, FALLBACK_DESCRIPTION).with_alternatives(
            FALLBACK_ALTERNATIVES
                .iter()
                .map(|c| (*c).to_string())
                .collect(),
        )
    }
}
