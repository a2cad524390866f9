//! TradeNavigator Classifiers
//!
//! HS code suggestion for free-text product descriptions.
//!
//! Classification is a cascade of tiers tried in preference order:
//! - Remote model: an external classification service, confidence
//!   reconciled against the category's expected chapters
//! - Static mapping: curated per-category candidates (confidence 0.85)
//! - Fallback: a fixed generic code (confidence 0.6)
//!
//! The cascade always returns a result; failures degrade to a lower tier.

pub mod classifier;
pub mod config;
pub mod fallback;
pub mod pipeline;
pub mod remote;
pub mod static_mapping;
pub mod tables;
pub mod terminology;
pub mod validation;

pub use classifier::{ClassificationContext, ClassificationStrategy};
pub use config::{ClassifierConfig, RemoteConfig};
pub use fallback::FallbackStrategy;
pub use pipeline::{CascadeBuilder, CascadeExecution, HsCodeClassifier};
pub use remote::{
    HttpRemoteClassifier, RemoteClassifier, RemoteModelStrategy, RemoteRequest, RemoteResponse,
};
pub use static_mapping::StaticMappingStrategy;
pub use tables::{CategorySpec, ChapterRange, MappingEntry, ReferenceTables};
pub use terminology::TerminologyMatcher;
pub use validation::{validate_code, validation_confidence, CodeValidation};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classifier::{ClassificationContext, ClassificationStrategy};
    pub use crate::pipeline::HsCodeClassifier;
    pub use crate::remote::{RemoteClassifier, RemoteRequest, RemoteResponse};
    pub use crate::tables::ReferenceTables;
    pub use tradenav_core::{ClassificationRequest, ClassificationResult, ClassificationSource};
}
