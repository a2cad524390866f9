//! TradeNavigator Core
//!
//! Core types and error handling shared across TradeNavigator components.
//!
//! This crate provides:
//! - Request and result types for HS code classification
//! - HS code helpers (chapter extraction, alternate de-duplication)
//! - Error types and result handling

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{
    clamp_confidence, dedup_alternatives, hs_chapter, ClassificationRequest,
    ClassificationResult, ClassificationSource,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{ClassificationRequest, ClassificationResult, ClassificationSource};
}
