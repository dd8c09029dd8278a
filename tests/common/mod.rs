use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use symptom_advisor::symptoms::{LabelCandidates, SymptomDataset};
use symptom_advisor::{AdvisorError, CompletionParams, LLMClient, Result};

#[allow(dead_code)]
pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[allow(dead_code)]
pub fn load_fixture(name: &str) -> SymptomDataset {
    SymptomDataset::load_with(fixture(name), &LabelCandidates::default())
        .expect("Failed to load fixture dataset")
}

/// One canned answer from [`ScriptedClient`].
#[allow(dead_code)]
pub enum Scripted {
    Text(String),
    Timeout,
    Api(String),
}

#[allow(dead_code)]
impl Scripted {
    pub fn text(text: impl Into<String>) -> Self {
        Scripted::Text(text.into())
    }

    pub fn json(value: serde_json::Value) -> Self {
        Scripted::Text(value.to_string())
    }
}

/// In-memory LLM that replays answers in order and records every prompt it sees.
#[allow(dead_code)]
#[derive(Default)]
pub struct ScriptedClient {
    responses: Mutex<VecDeque<Scripted>>,
    prompts: Mutex<Vec<(String, CompletionParams)>>,
}

#[allow(dead_code)]
impl ScriptedClient {
    pub fn new(responses: impl IntoIterator<Item = Scripted>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .map(|(prompt, _)| prompt.clone())
            .collect()
    }

    pub fn params(&self) -> Vec<CompletionParams> {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .map(|(_, params)| params.clone())
            .collect()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn remaining(&self) -> usize {
        self.responses.lock().unwrap().len()
    }
}

#[async_trait]
impl LLMClient for ScriptedClient {
    async fn complete(&self, prompt: &str, params: &CompletionParams) -> Result<String> {
        self.prompts
            .lock()
            .unwrap()
            .push((prompt.to_string(), params.clone()));
        match self.responses.lock().unwrap().pop_front() {
            Some(Scripted::Text(text)) => Ok(text),
            Some(Scripted::Timeout) => Err(AdvisorError::Timeout),
            Some(Scripted::Api(message)) => Err(AdvisorError::ApiError(message)),
            None => Err(AdvisorError::ApiError("no scripted response left".to_string())),
        }
    }
}
