//! Normalized 0-100 string similarity.
//!
//! The indel ratio comes from `rapidfuzz`; the weighted ratio composes it the
//! way rapidfuzz's `WRatio` does. Strings are compared as Unicode scalar values so
//! Thai (and other scripts with combining marks) are compared character by character.

use std::collections::BTreeSet;

use rapidfuzz::fuzz;

/// Scale applied to token-based scores in the weighted ratio.
const UNBASE_SCALE: f64 = 0.95;

/// Similarity metric used to compare an input token with a vocabulary entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scorer {
    /// Normalized indel similarity over the whole strings.
    Ratio,
    /// Weighted ratio: picks between whole-string, token-based and partial
    /// (substring) similarity depending on how different the lengths are.
    #[default]
    Weighted,
}

impl Scorer {
    pub fn score(self, a: &str, b: &str) -> f64 {
        match self {
            Scorer::Ratio => ratio(a, b),
            Scorer::Weighted => weighted_ratio(a, b),
        }
    }
}

/// Normalized indel similarity, `200 * LCS / (len(a) + len(b))`.
pub fn ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 100.0;
    }
    100.0 * fuzz::ratio(a.chars(), b.chars())
}

fn ratio_chars(a: &[char], b: &[char]) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 100.0;
    }
    100.0 * fuzz::ratio(a.iter().copied(), b.iter().copied())
}

/// Best ratio of the shorter string against any same-length window of the longer
/// one (plus the truncated windows at either edge).
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };

    if short.is_empty() {
        return if long.is_empty() { 100.0 } else { 0.0 };
    }
    if short.len() == long.len() {
        return ratio_chars(&short, &long);
    }

    let m = short.len();
    let mut best = 0.0f64;
    for start in 0..=long.len() - m {
        best = best.max(ratio_chars(&short, &long[start..start + m]));
        if best >= 100.0 {
            return 100.0;
        }
    }
    for k in 1..m {
        best = best.max(ratio_chars(&short, &long[..k]));
        best = best.max(ratio_chars(&short, &long[long.len() - k..]));
    }
    best
}

/// Ratio after sorting whitespace-separated tokens.
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    ratio(&sorted_tokens(a), &sorted_tokens(b))
}

fn sorted_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Ratio that ignores tokens shared by both strings beyond their intersection.
pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    let intersection: Vec<&str> = tokens_a.intersection(&tokens_b).copied().collect();
    let only_a: Vec<&str> = tokens_a.difference(&tokens_b).copied().collect();
    let only_b: Vec<&str> = tokens_b.difference(&tokens_a).copied().collect();

    if !intersection.is_empty() && (only_a.is_empty() || only_b.is_empty()) {
        return 100.0;
    }

    let sect = intersection.join(" ");
    let combined_a = join_nonempty(&sect, &only_a.join(" "));
    let combined_b = join_nonempty(&sect, &only_b.join(" "));

    ratio(&sect, &combined_a)
        .max(ratio(&sect, &combined_b))
        .max(ratio(&combined_a, &combined_b))
}

/// Partial ratio over token sets: any shared token is a full match, otherwise the
/// sorted token strings (and their differences) are aligned partially.
pub fn partial_token_ratio(a: &str, b: &str) -> f64 {
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }
    if tokens_a.intersection(&tokens_b).next().is_some() {
        return 100.0;
    }

    // Disjoint sets, so the differences are the full token sets.
    let joined_a = tokens_a.iter().copied().collect::<Vec<_>>().join(" ");
    let joined_b = tokens_b.iter().copied().collect::<Vec<_>>().join(" ");
    partial_ratio(&joined_a, &joined_b)
}

fn join_nonempty(head: &str, tail: &str) -> String {
    match (head.is_empty(), tail.is_empty()) {
        (true, _) => tail.to_string(),
        (_, true) => head.to_string(),
        _ => format!("{} {}", head, tail),
    }
}

/// Weighted ratio heuristic (rapidfuzz `WRatio`).
///
/// Strings of similar length (< 1.5x) are compared whole and token-wise; when one
/// is much longer, the best substring alignment is scaled down (0.9, or 0.6
/// past 8x) so a short token can still match a longer vocabulary phrase.
pub fn weighted_ratio(a: &str, b: &str) -> f64 {
    let len_a = a.chars().count();
    let len_b = b.chars().count();
    if len_a == 0 || len_b == 0 {
        return 0.0;
    }

    let base = ratio(a, b);
    let len_ratio = len_a.max(len_b) as f64 / len_a.min(len_b) as f64;

    if len_ratio < 1.5 {
        let token = token_sort_ratio(a, b).max(token_set_ratio(a, b));
        return base.max(token * UNBASE_SCALE);
    }

    let partial_scale = if len_ratio < 8.0 { 0.9 } else { 0.6 };
    base.max(partial_ratio(a, b) * partial_scale)
        .max(partial_token_ratio(a, b) * UNBASE_SCALE * partial_scale)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_identical_and_disjoint() {
        assert_eq!(ratio("fever", "fever"), 100.0);
        assert_eq!(ratio("abc", "xyz"), 0.0);
        assert_eq!(ratio("", ""), 100.0);
    }

    #[test]
    fn test_ratio_one_typo() {
        // LCS("fever", "fevr") = 4 -> 200 * 4 / 9
        let score = ratio("fever", "fevr");
        assert!((score - 88.888).abs() < 0.01, "got {}", score);
    }

    #[test]
    fn test_ratio_counts_thai_marks_as_chars() {
        // "ไข้" vs "มีไข้": LCS 3 over 3 + 5 chars
        assert!((ratio("ไข้", "มีไข้") - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_partial_ratio_substring() {
        assert_eq!(partial_ratio("ไข้", "มีไข้"), 100.0);
        assert_eq!(partial_ratio("cough", "dry cough"), 100.0);
        assert_eq!(partial_ratio("", "x"), 0.0);
    }

    #[test]
    fn test_token_ratios_ignore_order() {
        assert_eq!(token_sort_ratio("sore throat", "throat sore"), 100.0);
        assert_eq!(token_set_ratio("sore throat", "throat sore"), 100.0);
        assert_eq!(token_set_ratio("sore", "sore throat"), 100.0);
    }

    #[test]
    fn test_partial_token_ratio() {
        assert_eq!(partial_token_ratio("cough", "dry cough at night"), 100.0);
        assert_eq!(partial_token_ratio("", "cough"), 0.0);
        assert!(partial_token_ratio("throat", "sore throats") > 90.0);
    }

    #[test]
    fn test_weighted_ratio_scales_partial_matches() {
        // "ไข้" is 3 chars, "มีไข้" is 5: partial match scaled by 0.9
        let score = weighted_ratio("ไข้", "มีไข้");
        assert!((score - 90.0).abs() < 1e-9, "got {}", score);
        assert_eq!(weighted_ratio("", "fever"), 0.0);
        assert_eq!(weighted_ratio("ปวดหัว", "ปวดหัว"), 100.0);
    }

    #[test]
    fn test_weighted_ratio_uses_shared_tokens_for_long_phrases() {
        // word order differs, so only the token branch sees a full match: 100 * 0.95 * 0.9
        let score = weighted_ratio("throat sore", "sore throat is very painful today");
        assert!((score - 85.5).abs() < 1e-9, "got {}", score);
    }

    #[test]
    fn test_scorer_dispatch() {
        assert_eq!(Scorer::default(), Scorer::Weighted);
        assert!(Scorer::Ratio.score("ไข้", "มีไข้") < 80.0);
        assert!(Scorer::Weighted.score("ไข้", "มีไข้") >= 80.0);
    }
}
