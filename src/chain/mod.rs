//! The scripted LLM chain layered on top of a ranking.
//!
//! Stage 1 checks the ranking against the symptoms, stage 2 summarizes it, stage 3
//! writes the patient-facing reply. Stage 1 and 2 failures degrade to empty values
//! and the chain keeps going; only the final reply can fail.

mod guard;
pub mod prompts;

pub use guard::{Guard, GuardOutcome};

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::backend::{CompletionParams, LLMClient};
use crate::error::Result;
use crate::model::{Consistency, ConsistencyCheck, HealthAnswer, Instructor, SummaryReport};
use crate::symptoms::{MatchedSymptoms, RankedDisease};

/// Generation settings for the chain.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainConfig {
    /// Used by the consistency, summary and reply stages.
    pub stage_params: CompletionParams,
    /// Used by direct answers and disease questions.
    pub answer_params: CompletionParams,
    pub max_retries: usize,
    pub include_error_feedback: bool,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            stage_params: CompletionParams::chain_stage(),
            answer_params: CompletionParams::direct_answer(),
            max_retries: 0,
            include_error_feedback: true,
        }
    }
}

/// Everything the chain produced for one utterance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriageReport {
    pub symptoms: MatchedSymptoms,
    pub ranking: Vec<RankedDisease>,
    pub consistency: GuardOutcome<ConsistencyCheck>,
    pub summary: GuardOutcome<SummaryReport>,
    /// Formatted doctor-style reply, or the reason it could not be produced.
    pub reply: std::result::Result<String, String>,
}

impl TriageReport {
    /// Consistency verdict, `Unknown` when stage 1 failed.
    pub fn consistency_level(&self) -> Consistency {
        self.consistency
            .as_validated()
            .map(|check| check.consistency)
            .unwrap_or_default()
    }
}

/// Runs chain stages against an [`LLMClient`].
pub struct TriageChain<C> {
    client: Arc<C>,
    config: ChainConfig,
}

impl<C: LLMClient> TriageChain<C> {
    pub fn new(client: Arc<C>, config: ChainConfig) -> Self {
        Self { client, config }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    fn guard<T: Instructor + Send + 'static>(&self) -> Guard<T> {
        Guard::new()
            .max_retries(self.config.max_retries)
            .include_error_feedback(self.config.include_error_feedback)
    }

    pub async fn check_consistency(
        &self,
        symptoms: &MatchedSymptoms,
        ranked: &[RankedDisease],
    ) -> GuardOutcome<ConsistencyCheck> {
        let prompt = prompts::consistency_prompt(symptoms, ranked);
        self.guard::<ConsistencyCheck>()
            .run(self.client.as_ref(), &prompt, &self.config.stage_params)
            .await
    }

    pub async fn summarize(
        &self,
        symptoms: &MatchedSymptoms,
        ranked: &[RankedDisease],
        comment: &str,
    ) -> GuardOutcome<SummaryReport> {
        let prompt = prompts::summary_prompt(symptoms, ranked, comment);
        self.guard::<SummaryReport>()
            .run(self.client.as_ref(), &prompt, &self.config.stage_params)
            .await
    }

    /// Unstructured final reply, with bullet lines spaced out.
    pub async fn doctor_reply(&self, summary: &str, recommendation: &str) -> Result<String> {
        let prompt = prompts::doctor_reply_prompt(summary, recommendation);
        let reply = self
            .client
            .complete(&prompt, &self.config.stage_params)
            .await?;
        Ok(space_bullets(&reply).trim().to_string())
    }

    #[instrument(name = "triage_chain_run", skip_all, fields(symptoms = symptoms.len(), diseases = ranked.len()))]
    pub async fn run(&self, symptoms: &MatchedSymptoms, ranked: &[RankedDisease]) -> TriageReport {
        let consistency = self.check_consistency(symptoms, ranked).await;
        let comment = consistency
            .as_validated()
            .map(|check| check.comment.clone())
            .unwrap_or_default();

        let summary = self.summarize(symptoms, ranked, &comment).await;
        let (summary_text, recommendation) = summary
            .as_validated()
            .map(|report| (report.summary.clone(), report.recommendation.clone()))
            .unwrap_or_default();

        let reply = self
            .doctor_reply(&summary_text, &recommendation)
            .await
            .map_err(|e| {
                warn!(error = %e, "Doctor reply stage failed");
                e.to_string()
            });

        info!(
            consistency_ok = consistency.is_validated(),
            summary_ok = summary.is_validated(),
            reply_ok = reply.is_ok(),
            "Triage chain finished"
        );

        TriageReport {
            symptoms: symptoms.clone(),
            ranking: ranked.to_vec(),
            consistency,
            summary,
            reply,
        }
    }

    /// Single guarded answer from the symptoms and ranking.
    pub async fn direct_answer(
        &self,
        symptoms: &MatchedSymptoms,
        ranked: &[RankedDisease],
    ) -> GuardOutcome<HealthAnswer> {
        let prompt = prompts::health_answer_prompt(symptoms, ranked);
        self.guard::<HealthAnswer>()
            .run(self.client.as_ref(), &prompt, &self.config.answer_params)
            .await
            .map(|answer| HealthAnswer {
                answer: strip_leading_greeting(&answer.answer),
            })
    }

    /// Guarded general information about a disease the user named.
    pub async fn disease_info(&self, disease: &str) -> GuardOutcome<HealthAnswer> {
        let prompt = prompts::disease_info_prompt(disease);
        self.guard::<HealthAnswer>()
            .run(self.client.as_ref(), &prompt, &self.config.answer_params)
            .await
            .map(|answer| HealthAnswer {
                answer: answer.answer.trim().to_string(),
            })
    }
}

/// Put a blank line before every `•` bullet that directly follows text.
pub fn space_bullets(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut spaced = Vec::with_capacity(lines.len());
    for (i, line) in lines.iter().enumerate() {
        if line.trim_start().starts_with('•') && i > 0 && !lines[i - 1].trim().is_empty() {
            spaced.push("");
        }
        spaced.push(*line);
    }
    spaced.join("\n")
}

/// Drop a greeting the model put on the first line; the conversation greets once.
pub fn strip_leading_greeting(answer: &str) -> String {
    let answer = answer.trim();
    let mut lines = answer.lines();
    match lines.next() {
        Some(first) if is_greeting_line(first) => lines.collect::<Vec<_>>().join("\n").trim().to_string(),
        _ => answer.to_string(),
    }
}

fn is_greeting_line(line: &str) -> bool {
    let lower = line.trim().to_lowercase();
    lower.contains("สวัสดี") || lower.starts_with("hello") || lower.starts_with("hi ") || lower == "hi"
}
