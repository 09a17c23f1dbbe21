use thiserror::Error;

use crate::calendar::{conform_batch, EventRecord, SchemaError};
use crate::extract::filter::PastEventFilter;
use crate::extract::prompt::build_extraction_prompt;
use crate::extract::provider::{GenerativeModel, ProviderError, SyllabusDocument};
use crate::extract::timezone::TimezoneNormalizer;

/// One (API key, model) combination tried during extraction fallback.
#[derive(Debug, Clone, PartialEq)]
pub struct CredentialModelPair {
    pub api_key: String,
    pub model: String,
}

/// Why a single credential/model attempt produced no usable events. Attempt
/// failures are never surfaced to the caller; they are logged and the search
/// moves on to the next pair.
#[derive(Debug, Error)]
pub enum AttemptError {
    #[error("provider call failed: {0}")]
    Provider(#[from] ProviderError),
    #[error("output was not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("output shape not usable: {0}")]
    Schema(#[from] SchemaError),
}

/// Drives a syllabus through an ordered list of credential/model pairs and
/// returns the first batch of events that parses.
///
/// Credentials iterate outer, models inner; the first success short-circuits
/// the search; total exhaustion yields an empty list, indistinguishable from
/// a syllabus with no extractable events. Nothing is cached across calls.
pub struct SyllabusAnalyzer<P> {
    provider: P,
    api_keys: Vec<String>,
    models: Vec<String>,
    normalizer: TimezoneNormalizer,
}

impl<P: GenerativeModel> SyllabusAnalyzer<P> {
    pub fn new(provider: P, api_keys: Vec<String>, models: Vec<String>) -> Self {
        Self {
            provider,
            api_keys,
            models,
            normalizer: TimezoneNormalizer::local(),
        }
    }

    pub fn with_normalizer(mut self, normalizer: TimezoneNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    fn pairs(&self) -> impl Iterator<Item = CredentialModelPair> + '_ {
        self.api_keys.iter().flat_map(move |key| {
            self.models.iter().map(move |model| CredentialModelPair {
                api_key: key.clone(),
                model: model.clone(),
            })
        })
    }

    /// Raw candidate events from the first pair whose output parses. Past
    /// events and timezone normalization are not applied here.
    pub async fn extract_events(
        &self,
        document: &SyllabusDocument,
        categories: &[String],
        color_id: &str,
    ) -> Vec<EventRecord> {
        let prompt = build_extraction_prompt(categories, color_id);

        let mut failures: Vec<AttemptError> = Vec::new();
        for pair in self.pairs() {
            match self.attempt(document, &prompt, &pair, color_id).await {
                Ok(events) => {
                    tracing::info!(
                        "Extraction succeeded with model {} after {} failed attempts ({} events)",
                        pair.model,
                        failures.len(),
                        events.len()
                    );
                    return events;
                }
                Err(err) => {
                    tracing::warn!("Extraction attempt with model {} failed: {}", pair.model, err);
                    failures.push(err);
                }
            }
        }

        tracing::warn!(
            "All {} credential/model attempts exhausted; returning no events",
            failures.len()
        );
        Vec::new()
    }

    async fn attempt(
        &self,
        document: &SyllabusDocument,
        prompt: &str,
        pair: &CredentialModelPair,
        color_id: &str,
    ) -> Result<Vec<EventRecord>, AttemptError> {
        let text = self
            .provider
            .generate(document, prompt, &pair.model, &pair.api_key)
            .await?;

        let stripped = strip_code_fences(&text);
        let value: serde_json::Value = serde_json::from_str(&stripped)?;
        let events = conform_batch(value, color_id)?;
        Ok(events)
    }

    /// Full pipeline: extract, normalize timezones, drop past events.
    pub async fn analyze(
        &self,
        document: &SyllabusDocument,
        categories: &[String],
        color_id: &str,
    ) -> Vec<EventRecord> {
        let mut events = self.extract_events(document, categories, color_id).await;
        self.normalizer.normalize(&mut events);
        PastEventFilter::now().retain_upcoming(events)
    }
}

/// Models routinely wrap output in markdown fences despite instructions not
/// to. Remove them before strict parsing.
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}
