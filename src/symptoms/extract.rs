use serde::Serialize;
use tracing::{debug, trace};

use super::fuzzy::Scorer;
use crate::error::{AdvisorError, Result};

/// Minimum similarity (0-100) for a token to count as a vocabulary symptom.
pub const DEFAULT_MATCH_THRESHOLD: f64 = 80.0;

/// How free text is tokenized and matched against the vocabulary.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractorConfig {
    pub threshold: f64,
    /// Words that join symptoms ("and"). Non-ASCII connectors are removed wherever
    /// they occur since scripts like Thai don't separate words with spaces; ASCII
    /// connectors only as whole tokens.
    pub connectors: Vec<String>,
    /// Punctuation treated as whitespace.
    pub separators: Vec<char>,
    pub scorer: Scorer,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_MATCH_THRESHOLD,
            connectors: vec!["และ".to_string(), "and".to_string()],
            separators: vec![',', '，'],
            scorer: Scorer::default(),
        }
    }
}

impl ExtractorConfig {
    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn connectors<I, S>(mut self, connectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.connectors = connectors.into_iter().map(Into::into).collect();
        self
    }

    pub fn scorer(mut self, scorer: Scorer) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.threshold) {
            return Err(AdvisorError::ConfigError(format!(
                "match threshold must be within 0-100, got {}",
                self.threshold
            )));
        }
        Ok(())
    }
}

/// Symptoms recognized in one utterance: vocabulary names, no duplicates,
/// kept in the order they were first matched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MatchedSymptoms {
    names: Vec<String>,
}

impl MatchedSymptoms {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a symptom; returns false if it was already present.
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.contains(&name) {
            return false;
        }
        self.names.push(name);
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.names
    }

    pub fn join(&self, sep: &str) -> String {
        self.names.join(sep)
    }
}

impl<S: Into<String>> FromIterator<S> for MatchedSymptoms {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut matched = Self::new();
        for name in iter {
            matched.insert(name);
        }
        matched
    }
}

/// Split free text into candidate symptom tokens.
pub fn tokenize(text: &str, config: &ExtractorConfig) -> Vec<String> {
    let mut normalized: String = text
        .chars()
        .map(|c| if config.separators.contains(&c) { ' ' } else { c })
        .collect();

    for connector in config
        .connectors
        .iter()
        .filter(|c| !c.is_empty() && !c.is_ascii())
    {
        normalized = normalized.replace(connector.as_str(), " ");
    }

    normalized
        .split_whitespace()
        .filter(|token| {
            !config
                .connectors
                .iter()
                .any(|c| c.is_ascii() && c.eq_ignore_ascii_case(token))
        })
        .map(str::to_string)
        .collect()
}

/// Fuzzy-matches tokens of free text against a symptom vocabulary.
#[derive(Debug, Clone, Default)]
pub struct SymptomExtractor {
    config: ExtractorConfig,
}

impl SymptomExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Best-scoring vocabulary entry for `token` at or above the threshold.
    /// Equal scores resolve to the earlier vocabulary entry.
    pub fn best_match<'v>(&self, token: &str, vocabulary: &'v [String]) -> Option<(&'v str, f64)> {
        let mut best: Option<(&'v str, f64)> = None;
        for entry in vocabulary {
            let score = self.config.scorer.score(token, entry);
            if score >= self.config.threshold && best.is_none_or(|(_, top)| score > top) {
                best = Some((entry.as_str(), score));
            }
        }
        best
    }

    pub fn extract(&self, text: &str, vocabulary: &[String]) -> MatchedSymptoms {
        let mut matched = MatchedSymptoms::new();
        for token in tokenize(text, &self.config) {
            match self.best_match(&token, vocabulary) {
                Some((symptom, score)) => {
                    trace!(token = %token, symptom, score, "Token matched vocabulary");
                    matched.insert(symptom);
                }
                None => trace!(token = %token, "Token below match threshold"),
            }
        }
        debug!(
            matched = matched.len(),
            symptoms = ?matched.as_slice(),
            "Extracted symptoms from text"
        );
        matched
    }
}

/// Extract symptoms with the default tokenizer and scorer at `threshold`.
pub fn extract(text: &str, vocabulary: &[String], threshold: f64) -> MatchedSymptoms {
    SymptomExtractor::new(ExtractorConfig::default().threshold(threshold)).extract(text, vocabulary)
}
