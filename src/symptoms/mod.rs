//! Symptom matching and disease ranking.
//!
//! ```
//! use symptom_advisor::symptoms::{LabelCandidates, SymptomDataset, extract, rank};
//!
//! let csv = "fever,cough,diagnosis\n1,0,Flu\n1,1,Cold\n";
//! let dataset = SymptomDataset::from_reader(csv.as_bytes(), &LabelCandidates::default())?;
//!
//! let matched = extract("fever, cough", dataset.vocabulary(), 80.0);
//! let ranked = rank(&matched, &dataset);
//! assert_eq!(ranked[0].disease_name, "Cold");
//! assert_eq!(ranked[0].average_match_percent, 100.0);
//! # Ok::<(), symptom_advisor::AdvisorError>(())
//! ```

mod dataset;
mod extract;
pub mod fuzzy;
mod rank;

pub use dataset::{CaseRecord, LabelCandidates, SymptomDataset, UNNAMED_COLUMN_PREFIX};
pub use extract::{
    DEFAULT_MATCH_THRESHOLD, ExtractorConfig, MatchedSymptoms, SymptomExtractor, extract, tokenize,
};
pub use fuzzy::Scorer;
pub use rank::{DiseaseProfiles, RankedDisease, rank, top_n};
