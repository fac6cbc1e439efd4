//! Keyword normalization
//!
//! The engine treats incoming `raw_keywords` as already normalized by the
//! external extractor. This normalizer exists for callers whose extractor did
//! not populate them: it derives a keyword set from section spans.

use regex::Regex;
use std::collections::{BTreeSet, HashSet};
use strsim::jaro_winkler;
use unicode_segmentation::UnicodeSegmentation;

/// Near-duplicate keywords above this similarity collapse to the shorter form.
const FUZZY_DEDUP_THRESHOLD: f64 = 0.95;

pub struct KeywordNormalizer {
    stop_words: HashSet<String>,
    token_filter: Regex,
}

impl Default for KeywordNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl KeywordNormalizer {
    pub fn new() -> Self {
        // Keep +, # and . so tokens like "c++", "c#" and "node.js" survive
        let token_filter = Regex::new(r"[^a-z0-9+#.]+").expect("Invalid token filter regex");

        Self {
            stop_words: Self::create_stop_words(),
            token_filter,
        }
    }

    /// Normalize an explicit keyword list: lowercase, clean, drop stop words
    /// and single characters, collapse near-duplicates.
    pub fn normalize<I, S>(&self, raw: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut cleaned: Vec<String> = raw
            .into_iter()
            .filter_map(|k| self.clean_token(k.as_ref()))
            .collect();

        cleaned.sort();
        cleaned.dedup();
        self.collapse_near_duplicates(cleaned)
    }

    /// Derive a keyword set from free-text spans via word segmentation.
    pub fn from_spans(&self, spans: &[String]) -> BTreeSet<String> {
        let tokens = spans
            .iter()
            .flat_map(|span| span.unicode_words())
            .collect::<Vec<_>>();
        self.normalize(tokens)
    }

    fn clean_token(&self, token: &str) -> Option<String> {
        let lowered = token.trim().to_lowercase();
        let cleaned = self
            .token_filter
            .replace_all(&lowered, "")
            .trim_matches('.')
            .to_string();

        if cleaned.len() < 2 || self.stop_words.contains(&cleaned) {
            return None;
        }
        // Purely numeric tokens carry no keyword signal
        if cleaned.chars().all(|c| c.is_ascii_digit() || c == '.') {
            return None;
        }
        Some(cleaned)
    }

    /// Collapse near-identical keywords ("postgresql" vs "postgresql9"),
    /// keeping the shorter form. Input must be sorted and exact-deduplicated.
    fn collapse_near_duplicates(&self, keywords: Vec<String>) -> BTreeSet<String> {
        let mut by_length = keywords;
        by_length.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));

        let mut kept: Vec<String> = Vec::with_capacity(by_length.len());
        for keyword in by_length {
            let duplicate = kept
                .iter()
                .any(|existing| jaro_winkler(existing, &keyword) >= FUZZY_DEDUP_THRESHOLD);
            if !duplicate {
                kept.push(keyword);
            }
        }

        kept.into_iter().collect()
    }

    fn create_stop_words() -> HashSet<String> {
        [
            "a", "an", "and", "are", "as", "at", "be", "been", "but", "by", "for", "from",
            "had", "has", "have", "in", "is", "it", "its", "of", "on", "or", "our", "than",
            "that", "the", "their", "them", "then", "there", "these", "they", "this", "to",
            "was", "we", "were", "will", "with", "you", "your",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }
}
