use serde::{Deserialize, Serialize};
use serde_json::json;

use super::Instructor;
use crate::error::{AdvisorError, Result};
use crate::schema::{Schema, SchemaBuilder, SchemaType};

/// How well the ranked diseases agree with the reported symptoms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Consistency {
    Consistent,
    Partial,
    Inconsistent,
    #[default]
    #[serde(other)]
    Unknown,
}

impl Consistency {
    pub const VALUES: [&'static str; 4] = ["consistent", "partial", "inconsistent", "unknown"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Consistency::Consistent => "consistent",
            Consistency::Partial => "partial",
            Consistency::Inconsistent => "inconsistent",
            Consistency::Unknown => "unknown",
        }
    }
}

/// First chain stage: a sanity check of the ranking against the symptoms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsistencyCheck {
    pub consistency: Consistency,
    #[serde(default)]
    pub comment: String,
}

impl SchemaType for ConsistencyCheck {
    fn schema() -> Schema {
        SchemaBuilder::object()
            .title("ConsistencyCheck")
            .description("Whether the predicted diseases fit the reported symptoms")
            .enum_property(
                "consistency",
                "Agreement between the symptoms and the predicted diseases",
                &Consistency::VALUES,
            )
            .string_property(
                "comment",
                "Short note on what fits or does not fit; never a diagnosis",
            )
            .example(json!({
                "consistency": "partial",
                "comment": "Fever fits, but the cough is not typical for the top result."
            }))
            .build()
    }

    fn schema_name() -> Option<String> {
        Some("ConsistencyCheck".to_string())
    }
}

impl Instructor for ConsistencyCheck {
    fn validate(&self) -> Result<()> {
        let needs_comment = matches!(
            self.consistency,
            Consistency::Partial | Consistency::Inconsistent
        );
        if needs_comment && self.comment.trim().is_empty() {
            return Err(AdvisorError::ValidationError(format!(
                "comment is required when consistency is {}",
                self.consistency.as_str()
            )));
        }
        Ok(())
    }
}

/// Second chain stage: summary and next-step recommendation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryReport {
    pub summary: String,
    pub recommendation: String,
}

impl SchemaType for SummaryReport {
    fn schema() -> Schema {
        SchemaBuilder::object()
            .title("SummaryReport")
            .description("Summary of the symptom analysis for the patient-facing reply")
            .string_property(
                "summary",
                "Plain-language summary of the symptoms and the conditions they may relate to",
            )
            .string_property(
                "recommendation",
                "Self-care and when to see a doctor; no medication names or doses",
            )
            .build()
    }

    fn schema_name() -> Option<String> {
        Some("SummaryReport".to_string())
    }
}

impl Instructor for SummaryReport {
    fn validate(&self) -> Result<()> {
        if self.summary.trim().is_empty() {
            return Err(AdvisorError::ValidationError(
                "summary cannot be empty".to_string(),
            ));
        }
        if self.recommendation.trim().is_empty() {
            return Err(AdvisorError::ValidationError(
                "recommendation cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Single-prompt answer used for direct replies and disease questions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthAnswer {
    pub answer: String,
}

impl SchemaType for HealthAnswer {
    fn schema() -> Schema {
        SchemaBuilder::object()
            .title("HealthAnswer")
            .string_property(
                "answer",
                "Preliminary guidance that tells the patient to see a doctor",
            )
            .example(json!({ "answer": "Rest, drink water, and see a doctor if it gets worse." }))
            .build()
    }

    fn schema_name() -> Option<String> {
        Some("HealthAnswer".to_string())
    }
}

impl Instructor for HealthAnswer {
    fn validate(&self) -> Result<()> {
        if self.answer.trim().is_empty() {
            return Err(AdvisorError::ValidationError(
                "answer cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
