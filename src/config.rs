//! Runtime configuration for a [`SymptomAdvisor`](crate::conversation::SymptomAdvisor).

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use tracing::debug;

use crate::chain::ChainConfig;
use crate::error::{AdvisorError, Result};
use crate::symptoms::{ExtractorConfig, LabelCandidates};

pub const DATASET_ENV: &str = "SYMPTOM_ADVISOR_DATASET";
pub const THRESHOLD_ENV: &str = "SYMPTOM_ADVISOR_THRESHOLD";
pub const TOP_N_ENV: &str = "SYMPTOM_ADVISOR_TOP_N";
pub const MODEL_ENV: &str = "SYMPTOM_ADVISOR_MODEL";
pub const REPLY_MODE_ENV: &str = "SYMPTOM_ADVISOR_REPLY_MODE";

pub const DEFAULT_DATASET_PATH: &str = "./data/full_onehot_disease.csv";

/// How a symptom message is answered once diseases are ranked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReplyMode {
    /// Consistency check, summary, then doctor reply.
    #[default]
    Chain,
    /// One guarded answer.
    Direct,
}

impl fmt::Display for ReplyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplyMode::Chain => f.write_str("chain"),
            ReplyMode::Direct => f.write_str("direct"),
        }
    }
}

impl FromStr for ReplyMode {
    type Err = AdvisorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chain" => Ok(ReplyMode::Chain),
            "direct" => Ok(ReplyMode::Direct),
            other => Err(AdvisorError::ConfigError(format!(
                "unknown reply mode '{}', expected 'chain' or 'direct'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdvisorConfig {
    pub dataset_path: PathBuf,
    pub label_candidates: LabelCandidates,
    pub extractor: ExtractorConfig,
    /// Diseases kept from the ranking; values below 1 count as 1.
    pub top_n: usize,
    pub reply_mode: ReplyMode,
    pub chain: ChainConfig,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from(DEFAULT_DATASET_PATH),
            label_candidates: LabelCandidates::default(),
            extractor: ExtractorConfig::default(),
            top_n: 1,
            reply_mode: ReplyMode::default(),
            chain: ChainConfig::default(),
        }
    }
}

impl AdvisorConfig {
    /// Defaults overridden by any `SYMPTOM_ADVISOR_*` variables that are set.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup(DATASET_ENV) {
            config.dataset_path = PathBuf::from(path);
        }
        if let Some(raw) = lookup(THRESHOLD_ENV) {
            let threshold = raw.trim().parse::<f64>().map_err(|e| {
                AdvisorError::ConfigError(format!("invalid {} '{}': {}", THRESHOLD_ENV, raw, e))
            })?;
            config.extractor = config.extractor.threshold(threshold);
        }
        if let Some(raw) = lookup(TOP_N_ENV) {
            config.top_n = raw.trim().parse::<usize>().map_err(|e| {
                AdvisorError::ConfigError(format!("invalid {} '{}': {}", TOP_N_ENV, raw, e))
            })?;
        }
        if let Some(model) = lookup(MODEL_ENV).filter(|m| !m.trim().is_empty()) {
            config.chain.stage_params = config.chain.stage_params.model(model.clone());
            config.chain.answer_params = config.chain.answer_params.model(model);
        }
        if let Some(raw) = lookup(REPLY_MODE_ENV) {
            config.reply_mode = raw.parse()?;
        }

        config.validate()?;
        debug!(
            dataset = %config.dataset_path.display(),
            threshold = config.extractor.threshold,
            top_n = config.top_n,
            reply_mode = %config.reply_mode,
            "Loaded advisor configuration"
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.extractor.validate()?;
        if self.label_candidates.as_slice().is_empty() {
            return Err(AdvisorError::ConfigError(
                "at least one disease label column name is required".to_string(),
            ));
        }
        Ok(())
    }

    pub fn dataset_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.dataset_path = path.into();
        self
    }

    pub fn label_candidates(mut self, candidates: LabelCandidates) -> Self {
        self.label_candidates = candidates;
        self
    }

    pub fn extractor(mut self, extractor: ExtractorConfig) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn reply_mode(mut self, mode: ReplyMode) -> Self {
        self.reply_mode = mode;
        self
    }

    pub fn chain(mut self, chain: ChainConfig) -> Self {
        self.chain = chain;
        self
    }
}
