//! Chapter validation of HS codes against a category's expected chapters

use crate::tables::{ChapterRange, ReferenceTables};
use serde::Serialize;
use tradenav_core::hs_chapter;

/// Factor applied when the code's chapter is one the category expects
pub const IN_RANGE_FACTOR: f64 = 1.0;

/// Factor applied when the chapter falls outside every expected range
pub const OUT_OF_RANGE_FACTOR: f64 = 0.7;

/// Factor applied when the chapter cannot be checked at all
pub const UNVALIDATED_FACTOR: f64 = 0.6;

/// Outcome of checking a code against a category
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeValidation {
    pub hs_code: String,
    pub chapter: Option<u8>,
    pub category: String,
    pub category_recognized: bool,
    pub expected_chapters: Vec<ChapterRange>,
    /// `None` when there was nothing to check against
    pub within_expected_chapters: Option<bool>,
    pub confidence_factor: f64,
}

/// Check `code` against the expected chapters of `category`
pub fn validate_code(tables: &ReferenceTables, code: &str, category: &str) -> CodeValidation {
    let code = code.trim();
    let chapter = hs_chapter(code);
    let ranges = tables.chapter_ranges(category);

    let within = match (chapter, ranges) {
        (Some(chapter), Some(ranges)) => Some(ranges.iter().any(|r| r.contains(chapter))),
        _ => None,
    };

    let confidence_factor = match within {
        Some(true) => IN_RANGE_FACTOR,
        Some(false) => OUT_OF_RANGE_FACTOR,
        None => UNVALIDATED_FACTOR,
    };

    CodeValidation {
        hs_code: code.to_string(),
        chapter,
        category: category.to_string(),
        category_recognized: tables.is_recognized(category),
        expected_chapters: ranges.map(<[ChapterRange]>::to_vec).unwrap_or_default(),
        within_expected_chapters: within,
        confidence_factor,
    }
}

/// Just the confidence factor of [`validate_code`]
pub fn validation_confidence(tables: &ReferenceTables, code: &str, category: &str) -> f64 {
    validate_code(tables, code, category).confidence_factor
}
