use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, warn};

use super::dataset::SymptomDataset;
use super::extract::MatchedSymptoms;

/// One disease in a ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedDisease {
    pub disease_name: String,
    /// Mean fraction of the queried symptoms present in this disease's cases, 0-100,
    /// rounded to two decimals.
    pub average_match_percent: f64,
    /// Size of the query the percentage is relative to. Identical for every entry
    /// of one ranking.
    pub symptom_count_used: usize,
}

impl RankedDisease {
    pub fn new(disease_name: impl Into<String>, average_match_percent: f64, symptom_count_used: usize) -> Self {
        Self {
            disease_name: disease_name.into(),
            average_match_percent,
            symptom_count_used,
        }
    }
}

struct DiseaseTally<'d> {
    disease: &'d str,
    hits: usize,
    case_count: usize,
}

/// Rank diseases by how well their historical cases cover `symptoms`.
///
/// Every case contributes `matched / |symptoms|`; a disease's score is the mean over
/// its cases as a percentage, rounded half-to-even at two decimals. Output is sorted by score, highest first, with ties in
/// the order diseases first appear in the dataset.
///
/// Callers should not rank an empty query; it yields an empty list.
pub fn rank(symptoms: &MatchedSymptoms, dataset: &SymptomDataset) -> Vec<RankedDisease> {
    let query_len = symptoms.len();
    if query_len == 0 {
        warn!("Ranking requested for an empty symptom set");
        return Vec::new();
    }

    // Queried symptoms the dataset has no column for still count in the denominator.
    let columns: Vec<usize> = symptoms
        .iter()
        .filter_map(|s| dataset.symptom_index(s))
        .collect();

    let mut tallies: Vec<DiseaseTally<'_>> = Vec::new();
    let mut slots: HashMap<&str, usize> = HashMap::new();
    for record in dataset.records() {
        let matched = columns
            .iter()
            .filter(|&&col| record.has_symptom_at(col))
            .count();
        let slot = *slots.entry(record.disease()).or_insert_with(|| {
            tallies.push(DiseaseTally {
                disease: record.disease(),
                hits: 0,
                case_count: 0,
            });
            tallies.len() - 1
        });
        let tally = &mut tallies[slot];
        tally.hits += matched;
        tally.case_count += 1;
    }

    let ranked = sort_ranking(
        tallies
            .into_iter()
            .map(|tally| {
                let percent = match_percent(tally.hits, query_len, tally.case_count);
                RankedDisease::new(tally.disease, percent, query_len)
            })
            .collect(),
    );

    debug!(
        query_len,
        diseases = ranked.len(),
        top = ranked.first().map(|r| r.disease_name.as_str()),
        "Ranked diseases"
    );
    ranked
}

/// Keep the best `n` entries; `n` below one is treated as one.
pub fn top_n(mut ranked: Vec<RankedDisease>, n: usize) -> Vec<RankedDisease> {
    ranked.truncate(n.max(1));
    ranked
}

/// Per-disease symptom frequencies aggregated once from a dataset.
///
/// Ranking against profiles touches each disease once instead of every case. Both
/// paths sum integer hit counts and share one percent formula, so the result is
/// identical to [`rank`].
#[derive(Debug, Clone)]
pub struct DiseaseProfiles {
    profiles: Vec<DiseaseProfile>,
    index: HashMap<String, usize>,
}

#[derive(Debug, Clone)]
struct DiseaseProfile {
    disease: String,
    case_count: usize,
    symptom_counts: Vec<usize>,
}

impl DiseaseProfiles {
    pub fn from_dataset(dataset: &SymptomDataset) -> Self {
        let width = dataset.vocabulary().len();
        let mut profiles: Vec<DiseaseProfile> = Vec::new();
        let mut slots: HashMap<&str, usize> = HashMap::new();

        for record in dataset.records() {
            let slot = *slots.entry(record.disease()).or_insert_with(|| {
                profiles.push(DiseaseProfile {
                    disease: record.disease().to_string(),
                    case_count: 0,
                    symptom_counts: vec![0; width],
                });
                profiles.len() - 1
            });
            let profile = &mut profiles[slot];
            profile.case_count += 1;
            for (col, count) in profile.symptom_counts.iter_mut().enumerate() {
                if record.has_symptom_at(col) {
                    *count += 1;
                }
            }
        }

        let index = dataset
            .vocabulary()
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();

        debug!(diseases = profiles.len(), "Built disease profiles");
        Self { profiles, index }
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn rank(&self, symptoms: &MatchedSymptoms) -> Vec<RankedDisease> {
        let query_len = symptoms.len();
        if query_len == 0 {
            warn!("Ranking requested for an empty symptom set");
            return Vec::new();
        }

        let columns: Vec<usize> = symptoms
            .iter()
            .filter_map(|s| self.index.get(s).copied())
            .collect();

        sort_ranking(
            self.profiles
                .iter()
                .map(|profile| {
                    let hits: usize = columns.iter().map(|&c| profile.symptom_counts[c]).sum();
                    let percent = match_percent(hits, query_len, profile.case_count);
                    RankedDisease::new(profile.disease.as_str(), percent, query_len)
                })
                .collect(),
        )
    }
}

// `sort_by` is stable, so equal scores keep first-seen disease order.
fn sort_ranking(mut ranked: Vec<RankedDisease>) -> Vec<RankedDisease> {
    ranked.sort_by(|a, b| b.average_match_percent.total_cmp(&a.average_match_percent));
    ranked
}

/// `100 * hits / (query_len * case_count)` rounded half-to-even at two decimals.
///
/// Computed in integer hundredths so the rounding sees the exact quotient.
fn match_percent(hits: usize, query_len: usize, case_count: usize) -> f64 {
    let denominator = (query_len as u128) * (case_count as u128);
    if denominator == 0 {
        return 0.0;
    }
    let numerator = 10_000u128 * hits as u128;
    let mut hundredths = numerator / denominator;
    let twice_rem = 2 * (numerator % denominator);
    if twice_rem > denominator || (twice_rem == denominator && hundredths % 2 == 1) {
        hundredths += 1;
    }
    hundredths as f64 / 100.0
}
