//! Category terminology detection using the Aho-Corasick algorithm

use crate::tables::ReferenceTables;
use aho_corasick::AhoCorasick;
use std::collections::{BTreeSet, HashMap};
use tradenav_core::{Error, Result};

/// Detects diagnostic keywords of a category in a product description
pub struct TerminologyMatcher {
    matchers: HashMap<String, CategoryMatcher>,
}

struct CategoryMatcher {
    automaton: AhoCorasick,
    terms: Vec<String>,
}

impl TerminologyMatcher {
    /// Build one automaton per category that has terminology
    pub fn new(tables: &ReferenceTables) -> Result<Self> {
        let mut matchers = HashMap::new();

        for (category, spec) in tables.categories() {
            let terms: Vec<String> = spec
                .terms
                .iter()
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect();
            if terms.is_empty() {
                continue;
            }

            let automaton = AhoCorasick::builder()
                .ascii_case_insensitive(true)
                .build(&terms)
                .map_err(|e| {
                    Error::classifier(format!(
                        "Failed to build terminology matcher for '{}': {}",
                        category, e
                    ))
                })?;

            matchers.insert(category.to_string(), CategoryMatcher { automaton, terms });
        }

        Ok(Self { matchers })
    }

    /// Matched keywords, in table order rather than description order
    ///
    /// Matching is by substring on the lowercased description, so overlapping
    /// terms (e.g. "game" and "video game") are all reported.
    pub fn detect(&self, category: &str, description: &str) -> Vec<String> {
        let Some(matcher) = self.matchers.get(category) else {
            return Vec::new();
        };

        let text = description.to_lowercase();
        let hits: BTreeSet<usize> = matcher
            .automaton
            .find_overlapping_iter(&text)
            .map(|m| m.pattern().as_usize())
            .collect();

        hits.into_iter().map(|i| matcher.terms[i].clone()).collect()
    }

    /// Number of categories with terminology
    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }
}
