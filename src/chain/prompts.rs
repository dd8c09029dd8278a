//! Prompt text for each chain stage.

use crate::symptoms::{MatchedSymptoms, RankedDisease};

const SAFETY_RULES: &str = "Do not diagnose. Do not name or recommend any medication. Always advise seeing a doctor.";

/// `1. Cold 100% (2 symptoms)` lines, one per ranked disease.
pub fn format_ranking(ranked: &[RankedDisease]) -> String {
    ranked
        .iter()
        .enumerate()
        .map(|(i, r)| {
            format!(
                "{}. {} {}% ({} symptoms)",
                i + 1,
                r.disease_name,
                r.average_match_percent,
                r.symptom_count_used
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Placeholder for a missing upstream value.
pub fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() { "-" } else { value }
}

pub fn consistency_prompt(symptoms: &MatchedSymptoms, ranked: &[RankedDisease]) -> String {
    format!(
        "You review the output of a symptom-matching system.\n\
         Symptoms reported by the user: {}\n\
         Diseases predicted from historical cases (by match percentage):\n{}\n\n\
         Judge whether the predicted diseases are consistent with the symptoms and explain briefly. {}",
        symptoms.join(", "),
        format_ranking(ranked),
        SAFETY_RULES
    )
}

pub fn summary_prompt(symptoms: &MatchedSymptoms, ranked: &[RankedDisease], comment: &str) -> String {
    format!(
        "Symptoms reported by the user: {}\n\
         Diseases predicted from historical cases (by match percentage):\n{}\n\
         Reviewer comment: {}\n\n\
         Summarize what these symptoms may relate to and recommend sensible next steps. {}",
        symptoms.join(", "),
        format_ranking(ranked),
        or_dash(comment),
        SAFETY_RULES
    )
}

pub fn doctor_reply_prompt(summary: &str, recommendation: &str) -> String {
    format!(
        "Write a short, warm reply to the patient as a caring clinic assistant, using bullet points (•) for advice.\n\
         Summary: {}\n\
         Recommendation: {}\n\n\
         Do not greet the patient. {}",
        or_dash(summary),
        or_dash(recommendation),
        SAFETY_RULES
    )
}

pub fn health_answer_prompt(symptoms: &MatchedSymptoms, ranked: &[RankedDisease]) -> String {
    format!(
        "Symptoms reported by the user: {}\n\
         The system suggests these possible conditions (by percentage):\n{}\n\
         Give preliminary advice for these symptoms. {}",
        symptoms.join(", "),
        format_ranking(ranked),
        SAFETY_RULES
    )
}

pub fn disease_info_prompt(disease: &str) -> String {
    format!(
        "The user says they might have '{}'. Give general preliminary information about this condition \
         and stress seeing a doctor if they are unsure about their symptoms. {}",
        disease, SAFETY_RULES
    )
}
