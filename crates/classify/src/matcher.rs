use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use zapfin_core::{AccountId, Money, RecordHandle, StoredRecord};
use zapfin_parse::{fold, re};

use crate::util::similarity;

// Patterns run on folded text, so "já" is written "ja".
re!(
    payment_noise,
    r"\b(?:dar baixa|pagamento|paguei|quitei|ja|conta|fatura|boleto|de|da|do|no|na|a|o)\b"
);
re!(amounts, r"r\$|\breais\b|\d+(?:[.,]\d+)*");

/// Outcome of looking up a stored record from a free-text reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordMatch {
    pub found: bool,
    pub matched_description: Option<String>,
    pub value: Option<Money>,
    pub record_handle: Option<RecordHandle>,
    /// The cleaned query the lookup ran with.
    pub query: String,
    pub score: f32,
}

impl RecordMatch {
    pub fn not_found(query: &str) -> Self {
        RecordMatch {
            found: false,
            matched_description: None,
            value: None,
            record_handle: None,
            query: query.to_string(),
            score: 0.0,
        }
    }

    fn hit(record: &StoredRecord, query: &str, score: f32) -> Self {
        RecordMatch {
            found: true,
            matched_description: Some(record.description.clone()),
            value: Some(record.value),
            record_handle: Some(record.handle),
            query: query.to_string(),
            score,
        }
    }
}

/// Scores a cleaned, folded query against a folded description.
/// `None` means the pair does not match at all.
pub trait MatchStrategy: Send + Sync + fmt::Debug {
    fn score(&self, query: &str, description: &str) -> Option<f32>;
}

/// Query must be a substring of the description.
#[derive(Debug, Clone, Copy, Default)]
pub struct Contains;

impl MatchStrategy for Contains {
    fn score(&self, query: &str, description: &str) -> Option<f32> {
        description.contains(query).then_some(1.0)
    }
}

/// Substring hits score 1.0; otherwise the best edit similarity between the
/// query and the description or any of its words, if above `threshold`.
#[derive(Debug, Clone, Copy)]
pub struct Fuzzy {
    pub threshold: f32,
}

impl Default for Fuzzy {
    fn default() -> Self {
        Self { threshold: 0.75 }
    }
}

impl MatchStrategy for Fuzzy {
    fn score(&self, query: &str, description: &str) -> Option<f32> {
        if description.contains(query) {
            return Some(1.0);
        }
        let best = description
            .split_whitespace()
            .map(|word| similarity(query, word))
            .fold(similarity(query, description), f32::max);
        (best >= self.threshold).then_some(best)
    }
}

/// Locates a caller's stored record from a free-text reference.
#[derive(Debug)]
pub struct RecordMatcher {
    strategy: Box<dyn MatchStrategy>,
}

impl Default for RecordMatcher {
    fn default() -> Self {
        Self::new(Contains)
    }
}

impl RecordMatcher {
    pub fn new(strategy: impl MatchStrategy + 'static) -> Self {
        Self {
            strategy: Box::new(strategy),
        }
    }

    pub fn fuzzy(threshold: f32) -> Self {
        Self::new(Fuzzy { threshold })
    }

    /// Strip payment vocabulary and amounts, leaving the part that names the
    /// record. Output is folded.
    pub fn clean_query(text: &str) -> String {
        let folded = fold(text);
        let without_amounts = amounts().replace_all(&folded, " ");
        let cleaned = payment_noise().replace_all(&without_amounts, " ");
        cleaned
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_string()
    }

    /// Best record owned by `owner` for the reference in `text`. Ties go to
    /// the most recently recorded entry.
    pub fn find(&self, text: &str, records: &[StoredRecord], owner: &AccountId) -> RecordMatch {
        let query = Self::clean_query(text);
        if query.is_empty() {
            return RecordMatch::not_found(&query);
        }

        let best = records
            .iter()
            .filter(|r| &r.owner == owner)
            .filter_map(|r| {
                self.strategy
                    .score(&query, &fold(&r.description))
                    .map(|score| (r, score))
            })
            .max_by(|(a, sa), (b, sb)| {
                sa.partial_cmp(sb)
                    .unwrap_or(Ordering::Equal)
                    .then_with(|| recency(a, b))
            });

        match best {
            Some((record, score)) => RecordMatch::hit(record, &query, score),
            None => RecordMatch::not_found(&query),
        }
    }

    /// Most recently recorded entry owned by `owner`.
    pub fn latest(records: &[StoredRecord], owner: &AccountId) -> RecordMatch {
        records
            .iter()
            .filter(|r| &r.owner == owner)
            .max_by(|a, b| recency(a, b))
            .map(|r| RecordMatch::hit(r, "", 1.0))
            .unwrap_or_else(|| RecordMatch::not_found(""))
    }
}

fn recency(a: &StoredRecord, b: &StoredRecord) -> Ordering {
    a.recorded_at
        .cmp(&b.recorded_at)
        .then_with(|| a.handle.cmp(&b.handle))
}
