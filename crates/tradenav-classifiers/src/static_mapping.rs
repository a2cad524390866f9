//! Static mapping tier: curated per-category candidates

use crate::classifier::{ClassificationContext, ClassificationStrategy};
use crate::tables::{MappingEntry, ReferenceTables};
use async_trait::async_trait;
use std::sync::Arc;
use tradenav_core::{ClassificationResult, ClassificationSource};

/// Fixed confidence of a static mapping suggestion
pub const STATIC_MAPPING_CONFIDENCE: f64 = 0.85;

/// Alternatives taken from the mapping after the primary entry
const MAX_ALTERNATIVES: usize = 3;

/// Suggests the category's preferred code from the mapping table
pub struct StaticMappingStrategy {
    tables: Arc<ReferenceTables>,
}

impl StaticMappingStrategy {
    pub fn new(tables: Arc<ReferenceTables>) -> Self {
        Self { tables }
    }

    /// Build the result for a category without going through the cascade
    pub fn lookup(&self, category: &str) -> Option<ClassificationResult> {
        let entries = self.tables.mappings(category)?;
        let (primary, rest) = entries.split_first()?;
        let primary_code = primary.code.trim();

        let mut alternatives: Vec<&MappingEntry> = Vec::with_capacity(MAX_ALTERNATIVES);
        for entry in rest {
            if alternatives.len() == MAX_ALTERNATIVES {
                break;
            }
            let code = entry.code.trim();
            if code == primary_code || alternatives.iter().any(|a| a.code.trim() == code) {
                continue;
            }
            alternatives.push(entry);
        }

        let explanations = std::iter::once(format!(
            "Most common {} classification: {}",
            category, primary.description
        ))
        .chain(
            alternatives
                .iter()
                .map(|a| format!("Alternative {} classification: {}", category, a.description)),
        )
        .collect();

        Some(
            ClassificationResult::new(
                primary_code,
                STATIC_MAPPING_CONFIDENCE,
                ClassificationSource::StaticMapping,
            )
            .with_description(primary.description.clone())
            .with_alternatives(alternatives.iter().map(|a| a.code.as_str()))
            .with_explanations(explanations),
        )
    }
}

#[async_trait]
impl ClassificationStrategy for StaticMappingStrategy {
    async fn attempt(&self, ctx: &ClassificationContext) -> Option<ClassificationResult> {
        if !ctx.category_recognized {
            return None;
        }
        self.lookup(&ctx.category)
    }

    fn name(&self) -> &str {
        "static_mapping"
    }
}
