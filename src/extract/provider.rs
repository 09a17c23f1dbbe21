use std::path::Path;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Authentication failed")]
    AuthenticationFailed,
    #[error("Rate limit exceeded")]
    RateLimited,
    #[error("Request error: {0}")]
    RequestError(String),
    #[error("Response carried no candidate text")]
    EmptyResponse,
}

/// A syllabus as uploaded: raw bytes plus the MIME type the provider should
/// interpret them as.
#[derive(Debug, Clone)]
pub struct SyllabusDocument {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl SyllabusDocument {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let mime_type = match path.extension().and_then(|ext| ext.to_str()) {
            Some("txt") => "text/plain",
            Some("png") => "image/png",
            Some("jpg") | Some("jpeg") => "image/jpeg",
            _ => "application/pdf",
        };
        Ok(Self::new(bytes, mime_type))
    }
}

/// The document generation capability: hand a document and instructions to a
/// named model under a given credential, get free-form text back. Output is
/// untrusted; callers must parse defensively.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    async fn generate(
        &self,
        document: &SyllabusDocument,
        instructions: &str,
        model: &str,
        api_key: &str,
    ) -> Result<String, ProviderError>;
}

pub struct GeminiClient {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Inline {
        inline_data: InlineData<'a>,
    },
    Text {
        text: &'a str,
    },
}

#[derive(Debug, Serialize)]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GeminiClient {
    pub fn new() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }
}

impl Default for GeminiClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate(
        &self,
        document: &SyllabusDocument,
        instructions: &str,
        model: &str,
        api_key: &str,
    ) -> Result<String, ProviderError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Inline {
                        inline_data: InlineData {
                            mime_type: &document.mime_type,
                            data: BASE64.encode(&document.bytes),
                        },
                    },
                    Part::Text { text: instructions },
                ],
            }],
        };

        tracing::info!(
            "Sending {} byte document to model {}",
            document.bytes.len(),
            model
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        tracing::info!("Generate content response status: {}", status);

        if status == 401 || status == 403 {
            tracing::error!("Authentication failed for model {}", model);
            return Err(ProviderError::AuthenticationFailed);
        }

        if status == 429 {
            tracing::warn!("Rate limit exceeded for model {}", model);
            return Err(ProviderError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await?;
            tracing::error!("Generate content failed. Status: {}, Body: {}", status, body);
            return Err(ProviderError::RequestError(format!(
                "Status {}: {}",
                status, body
            )));
        }

        let generated: GenerateResponse = response.json().await?;

        let text: String = generated
            .candidates
            .unwrap_or_default()
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts.unwrap_or_default())
            .filter_map(|p| p.text)
            .collect();

        if text.is_empty() {
            return Err(ProviderError::EmptyResponse);
        }

        Ok(text)
    }
}
