use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use super::intents::{
    self, CLARIFY_SYMPTOMS, DISEASE_INFO_FALLBACK, FALLBACK_REPLY, GREETING_WORDS, HOW_ARE_YOU_WORDS,
    MEDICATION_REFUSAL, SmallTalk, THANK_WORDS,
};
use super::session::ConversationSession;
use crate::backend::LLMClient;
use crate::chain::{GuardOutcome, TriageChain, TriageReport};
use crate::config::{AdvisorConfig, ReplyMode};
use crate::error::Result;
use crate::symptoms::{DiseaseProfiles, MatchedSymptoms, RankedDisease, SymptomDataset, SymptomExtractor, top_n};
use crate::vision::{SkinClassifier, SkinImage, UNASSESSABLE_IMAGE_REPLY};

/// Which route produced a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyKind {
    Thanks,
    HowAreYou,
    Greeting,
    DiseaseInfo,
    MedicationRefusal,
    ClarifySymptoms,
    Triage,
    DirectAnswer,
    SkinAssessment,
}

/// What the advisor said, and why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdvisorReply {
    pub text: String,
    pub kind: ReplyKind,
    /// Ranked diseases behind a symptom reply, empty for every other route.
    pub ranking: Vec<RankedDisease>,
    /// Full chain output, present for chain-mode symptom replies.
    pub triage: Option<TriageReport>,
}

impl AdvisorReply {
    fn canned(kind: ReplyKind, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind,
            ranking: Vec::new(),
            triage: None,
        }
    }
}

/// Routes user messages to canned replies, the symptom pipeline and the LLM chain.
///
/// The dataset is shared read-only; all per-conversation state lives in the
/// [`ConversationSession`] passed to each call, so one advisor can serve many
/// conversations.
pub struct SymptomAdvisor<C> {
    dataset: Arc<SymptomDataset>,
    profiles: DiseaseProfiles,
    diseases: Vec<String>,
    extractor: SymptomExtractor,
    chain: TriageChain<C>,
    top_n: usize,
    reply_mode: ReplyMode,
}

impl<C: LLMClient> SymptomAdvisor<C> {
    pub fn new(dataset: Arc<SymptomDataset>, client: Arc<C>, config: &AdvisorConfig) -> Result<Self> {
        config.validate()?;
        let profiles = DiseaseProfiles::from_dataset(&dataset);
        let diseases = dataset.diseases().into_iter().map(str::to_string).collect();
        Ok(Self {
            profiles,
            diseases,
            extractor: SymptomExtractor::new(config.extractor.clone()),
            chain: TriageChain::new(client, config.chain.clone()),
            top_n: config.top_n,
            reply_mode: config.reply_mode,
            dataset,
        })
    }

    /// Load the dataset named in `config` and build an advisor around it.
    pub fn from_config(config: &AdvisorConfig, client: Arc<C>) -> Result<Self> {
        let dataset = SymptomDataset::load_with(&config.dataset_path, &config.label_candidates)?;
        info!(
            path = %config.dataset_path.display(),
            cases = dataset.len(),
            symptoms = dataset.vocabulary().len(),
            "Loaded symptom dataset"
        );
        Self::new(Arc::new(dataset), client, config)
    }

    pub fn dataset(&self) -> &SymptomDataset {
        &self.dataset
    }

    pub fn chain(&self) -> &TriageChain<C> {
        &self.chain
    }

    pub fn reply_mode(&self) -> ReplyMode {
        self.reply_mode
    }

    pub fn extract(&self, message: &str) -> MatchedSymptoms {
        self.extractor.extract(message, self.dataset.vocabulary())
    }

    /// Ranked diseases for `symptoms`, cut to the configured top-N.
    pub fn rank(&self, symptoms: &MatchedSymptoms) -> Vec<RankedDisease> {
        top_n(self.profiles.rank(symptoms), self.top_n)
    }

    /// Answer one user message, recording both turns in `session`.
    #[instrument(name = "advisor_reply", skip_all, fields(turn = session.turn_count()))]
    pub async fn reply(&self, session: &mut ConversationSession, message: &str) -> AdvisorReply {
        session.push_user(message);
        let reply = self.route(session, message).await;
        debug!(kind = ?reply.kind, "Routed message");

        session.push_assistant(reply.text.clone());
        session.mark_greeted();
        if let Some(report) = &reply.triage {
            session.set_last_triage(report.clone());
        }
        reply
    }

    async fn route(&self, session: &ConversationSession, message: &str) -> AdvisorReply {
        let seed = session.assistant_turns();

        if intents::contains_any(message, THANK_WORDS) {
            return AdvisorReply::canned(ReplyKind::Thanks, SmallTalk::Thanks.reply(seed));
        }
        if intents::contains_any(message, HOW_ARE_YOU_WORDS) {
            return AdvisorReply::canned(ReplyKind::HowAreYou, SmallTalk::HowAreYou.reply(seed));
        }
        if let Some(disease) = intents::find_disease_mention(message, &self.diseases) {
            return self.disease_info(disease).await;
        }
        if !session.greeted() && intents::contains_any(message, GREETING_WORDS) {
            return AdvisorReply::canned(ReplyKind::Greeting, SmallTalk::Greeting.reply(seed));
        }
        if intents::mentions_medication(message) {
            return AdvisorReply::canned(ReplyKind::MedicationRefusal, MEDICATION_REFUSAL);
        }

        let symptoms = self.extract(message);
        if symptoms.is_empty() {
            debug!("No symptoms recognized");
            return AdvisorReply::canned(ReplyKind::ClarifySymptoms, CLARIFY_SYMPTOMS);
        }

        let ranking = self.rank(&symptoms);
        info!(
            symptoms = %symptoms.join(", "),
            top = ranking.first().map(|r| r.disease_name.as_str()).unwrap_or("-"),
            "Ranked diseases"
        );

        match self.reply_mode {
            ReplyMode::Chain => self.chain_reply(symptoms, ranking).await,
            ReplyMode::Direct => self.direct_reply(symptoms, ranking).await,
        }
    }

    async fn disease_info(&self, disease: &str) -> AdvisorReply {
        debug!(disease, "Disease mentioned");
        let text = match self.chain.disease_info(disease).await {
            GuardOutcome::Validated(answer) => answer.answer,
            _ => DISEASE_INFO_FALLBACK.to_string(),
        };
        AdvisorReply::canned(ReplyKind::DiseaseInfo, text)
    }

    async fn chain_reply(&self, symptoms: MatchedSymptoms, ranking: Vec<RankedDisease>) -> AdvisorReply {
        let report = self.chain.run(&symptoms, &ranking).await;
        let text = match &report.reply {
            Ok(text) if !text.is_empty() => text.clone(),
            _ => FALLBACK_REPLY.to_string(),
        };
        AdvisorReply {
            text,
            kind: ReplyKind::Triage,
            ranking,
            triage: Some(report),
        }
    }

    async fn direct_reply(&self, symptoms: MatchedSymptoms, ranking: Vec<RankedDisease>) -> AdvisorReply {
        let text = match self.chain.direct_answer(&symptoms, &ranking).await {
            GuardOutcome::Validated(answer) => answer.answer,
            GuardOutcome::SchemaInvalid(_) => FALLBACK_REPLY.to_string(),
            GuardOutcome::UpstreamError(reason) => format!("[ERROR] {}", reason),
        };
        AdvisorReply {
            text,
            kind: ReplyKind::DirectAnswer,
            ranking,
            triage: None,
        }
    }

    /// Classify an uploaded skin photo and record the assessment in `session`.
    pub fn assess_skin_image(
        &self,
        session: &mut ConversationSession,
        classifier: &dyn SkinClassifier,
        image: &SkinImage,
    ) -> AdvisorReply {
        let text = match classifier.classify(image) {
            Ok(classification) => {
                info!(
                    label = %classification.label,
                    confidence = classification.confidence,
                    "Skin image classified"
                );
                classification.describe()
            }
            Err(e) => {
                warn!(error = %e, "Skin image classification failed");
                UNASSESSABLE_IMAGE_REPLY.to_string()
            }
        };
        session.push_assistant(text.clone());
        AdvisorReply::canned(ReplyKind::SkinAssessment, text)
    }
}
