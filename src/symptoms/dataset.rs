use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::{debug, info, instrument, warn};

use crate::error::{AdvisorError, Result};

/// Header prefix pandas-style exports give to index columns and blank header cells.
pub const UNNAMED_COLUMN_PREFIX: &str = "Unnamed";

const UTF8_BOM: char = '\u{feff}';

/// Ordered list of column names that may hold the disease label.
///
/// The first candidate (in this order, not header order) that appears in the
/// dataset header is used.
///
/// ```
/// use symptom_advisor::symptoms::LabelCandidates;
///
/// let candidates = LabelCandidates::new(["outcome", "diagnosis"]);
/// let header = vec!["diagnosis".to_string(), "outcome".to_string()];
/// assert_eq!(candidates.resolve(&header), Some((1, "outcome")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelCandidates(Vec<String>);

impl LabelCandidates {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Find the winning candidate in `header`, returning its column position and name.
    pub fn resolve<'h>(&self, header: &'h [String]) -> Option<(usize, &'h str)> {
        self.0.iter().find_map(|candidate| {
            header
                .iter()
                .position(|column| column == candidate)
                .map(|idx| (idx, header[idx].as_str()))
        })
    }
}

impl Default for LabelCandidates {
    fn default() -> Self {
        Self::new(["diagnosis", "disease", "โรค"])
    }
}

/// One historical case: its disease label and which vocabulary symptoms were present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseRecord {
    disease: String,
    present: Vec<bool>,
}

impl CaseRecord {
    pub fn disease(&self) -> &str {
        &self.disease
    }

    /// Whether the symptom at vocabulary position `idx` was recorded for this case.
    pub fn has_symptom_at(&self, idx: usize) -> bool {
        self.present.get(idx).copied().unwrap_or(false)
    }
}

/// The disease/symptom co-occurrence table the ranker scans.
///
/// Loaded once and never mutated; share it behind an `Arc` across sessions.
#[derive(Debug, Clone)]
pub struct SymptomDataset {
    records: Vec<CaseRecord>,
    vocabulary: Vec<String>,
    index: HashMap<String, usize>,
    disease_label_field: String,
}

impl SymptomDataset {
    /// Load a dataset with the default label candidates.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with(path, &LabelCandidates::default())
    }

    #[instrument(skip(path, candidates), fields(path = %path.as_ref().display()))]
    pub fn load_with(path: impl AsRef<Path>, candidates: &LabelCandidates) -> Result<Self> {
        let file = File::open(path.as_ref()).map_err(|e| {
            warn!(error = %e, "Unable to open symptom dataset");
            e
        })?;
        Self::from_reader(file, candidates)
    }

    /// Parse a dataset from any CSV source with a header row.
    pub fn from_reader<R: Read>(reader: R, candidates: &LabelCandidates) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);

        let header: Vec<String> = csv_reader
            .headers()?
            .iter()
            .enumerate()
            .map(|(i, name)| {
                if i == 0 {
                    name.trim_start_matches(UTF8_BOM).to_string()
                } else {
                    name.to_string()
                }
            })
            .collect();

        let (label_idx, label_field) = candidates.resolve(&header).ok_or_else(|| {
            AdvisorError::SchemaError(format!(
                "no disease label column found; expected one of {:?}, header was {:?}",
                candidates.as_slice(),
                header
            ))
        })?;
        debug!(label_field, column = label_idx, "Resolved disease label field");

        let mut vocabulary = Vec::new();
        let mut columns = Vec::new();
        let mut seen = HashSet::new();
        for (idx, name) in header.iter().enumerate() {
            if idx == label_idx {
                continue;
            }
            if is_placeholder_column(name) {
                warn!(column = idx, name = %name, "Skipping unnamed placeholder column");
                continue;
            }
            if !seen.insert(name.as_str()) {
                warn!(column = idx, name = %name, "Skipping duplicate symptom column");
                continue;
            }
            vocabulary.push(name.clone());
            columns.push(idx);
        }

        if vocabulary.is_empty() {
            return Err(AdvisorError::SchemaError(
                "dataset header has no symptom columns".to_string(),
            ));
        }

        let mut records = Vec::new();
        for row in csv_reader.records() {
            let row = row?;
            let disease = row.get(label_idx).unwrap_or_default().to_string();
            let present = columns
                .iter()
                .map(|&col| is_truthy(row.get(col).unwrap_or_default()))
                .collect();
            records.push(CaseRecord { disease, present });
        }

        let index = vocabulary
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();

        info!(
            records = records.len(),
            symptoms = vocabulary.len(),
            label_field,
            "Loaded symptom dataset"
        );

        Ok(Self {
            records,
            vocabulary,
            index,
            disease_label_field: label_field.to_string(),
        })
    }

    /// Known symptom names, in header order.
    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    pub fn disease_label_field(&self) -> &str {
        &self.disease_label_field
    }

    pub fn records(&self) -> &[CaseRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Vocabulary position of a symptom, if the dataset has that column.
    pub fn symptom_index(&self, symptom: &str) -> Option<usize> {
        self.index.get(symptom).copied()
    }

    /// Distinct disease labels in the order they first appear.
    pub fn diseases(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .map(CaseRecord::disease)
            .filter(|disease| seen.insert(*disease))
            .collect()
    }
}

fn is_placeholder_column(name: &str) -> bool {
    name.trim().is_empty() || name.starts_with(UNNAMED_COLUMN_PREFIX)
}

/// Indicator cells are truthy when numeric and non-zero, or a yes/true word.
pub(crate) fn is_truthy(cell: &str) -> bool {
    let cell = cell.trim();
    if let Ok(value) = cell.parse::<f64>() {
        return value != 0.0 && !value.is_nan();
    }
    matches!(cell.to_ascii_lowercase().as_str(), "true" | "yes" | "y")
}
