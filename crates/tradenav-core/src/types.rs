//! Core types for TradeNavigator

use serde::{Deserialize, Serialize};
use std::fmt;

/// A request to suggest an HS code for a product
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationRequest {
    /// Free-text product description (may be empty)
    #[serde(default)]
    pub description: String,

    /// Coarse product category, e.g. "Electronics"
    #[serde(default)]
    pub category: String,
}

impl ClassificationRequest {
    /// Create a new classification request
    pub fn new(description: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            category: category.into(),
        }
    }
}

/// Which tier of the classification cascade produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassificationSource {
    /// The remote classification service
    RemoteModel,
    /// The curated per-category mapping table
    StaticMapping,
    /// The fixed terminal result
    Fallback,
}

impl ClassificationSource {
    /// Lowercase label, used for logs and metric labels
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RemoteModel => "remote_model",
            Self::StaticMapping => "static_mapping",
            Self::Fallback => "fallback",
        }
    }
}

impl fmt::Display for ClassificationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Suggested HS code with alternates, confidence and explanations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    /// Primary code, `NNNN.NN.NN`
    pub hs_code: String,

    /// Confidence score (0.0-1.0)
    pub confidence: f64,

    /// Human-readable description of the primary code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Secondary candidates, best first. Never contains `hs_code`.
    #[serde(default)]
    pub alternative_codes: Vec<String>,

    /// One line per candidate in `[primary, ...alternatives]` order
    #[serde(default)]
    pub explanations: Vec<String>,

    /// Tier that produced this result
    pub source: ClassificationSource,
}

impl ClassificationResult {
    /// Create a result with no alternates or explanations
    pub fn new(hs_code: impl Into<String>, confidence: f64, source: ClassificationSource) -> Self {
        Self {
            hs_code: hs_code.into(),
            confidence: clamp_confidence(confidence),
            description: None,
            alternative_codes: Vec::new(),
            explanations: Vec::new(),
            source,
        }
    }

    /// Attach a description of the primary code
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attach alternative codes, dropping blanks, duplicates and the primary
    pub fn with_alternatives<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.alternative_codes = dedup_alternatives(&self.hs_code, codes);
        self
    }

    /// Attach explanations
    pub fn with_explanations(mut self, explanations: Vec<String>) -> Self {
        self.explanations = explanations;
        self
    }
}

/// Clamp a confidence score into `[0, 1]`. NaN becomes 0.
pub fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Extract the two-digit chapter from an HS code
///
/// Returns `None` when the first two characters are not both digits.
pub fn hs_chapter(code: &str) -> Option<u8> {
    let code = code.trim();
    let prefix = code.get(..2)?;
    if !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    prefix.parse().ok()
}

/// Trim candidate codes and keep the first occurrence of each, skipping `primary`
pub fn dedup_alternatives<I, S>(primary: &str, codes: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let primary = primary.trim();
    let mut out: Vec<String> = Vec::new();
    for code in codes {
        let code = code.as_ref().trim();
        if code.is_empty() || code == primary || out.iter().any(|c| c == code) {
            continue;
        }
        out.push(code.to_string());
    }
    out
}
