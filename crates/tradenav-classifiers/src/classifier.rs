//! Classification strategy trait and common types

use async_trait::async_trait;
use tradenav_core::ClassificationResult;

/// One tier of the classification cascade
///
/// A strategy either produces a result or declines with `None`; it never
/// errors. Failures inside a strategy are logged and turned into `None` so the
/// cascade can move on to the next tier.
#[async_trait]
pub trait ClassificationStrategy: Send + Sync {
    /// Try to classify the product described by `ctx`
    async fn attempt(&self, ctx: &ClassificationContext) -> Option<ClassificationResult>;

    /// Get the strategy name
    fn name(&self) -> &str;

    /// Whether the strategy is skipped for trivial descriptions
    fn requires_description(&self) -> bool {
        false
    }
}

/// Per-request input shared by all tiers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationContext {
    /// Product description as given
    pub description: String,

    /// Category as given
    pub category: String,

    /// Whether `category` is one of the enumerated keys
    pub category_recognized: bool,

    /// Category keywords found in the description, in table order
    pub detected_terms: Vec<String>,

    /// Description too short to be worth analyzing
    pub trivial: bool,
}

impl ClassificationContext {
    /// Context with no terminology and the given triviality
    pub fn new(
        description: impl Into<String>,
        category: impl Into<String>,
        category_recognized: bool,
    ) -> Self {
        Self {
            description: description.into(),
            category: category.into(),
            category_recognized,
            detected_terms: Vec::new(),
            trivial: false,
        }
    }

    pub fn with_detected_terms(mut self, terms: Vec<String>) -> Self {
        self.detected_terms = terms;
        self
    }

    pub fn with_trivial(mut self, trivial: bool) -> Self {
        self.trivial = trivial;
        self
    }
}

/// Whether a description is too short to analyze
pub fn is_trivial_description(description: &str, min_len: usize) -> bool {
    description.trim().chars().count() < min_len
}
