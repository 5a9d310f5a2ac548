use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::ApiCredential;
use crate::error::ServiceError;

const LIST_PAGE_SIZE: u32 = 1000;
const API_KEY_HEADER: &str = "x-goog-api-key";
const GENERATE_METHOD: &str = "generateContent";

/// A remote model as advertised by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDescriptor {
    /// Full resource name, e.g. "models/gemini-2.5-flash".
    pub name: String,
    pub supports_generation: bool,
}

impl ModelDescriptor {
    /// Name without its namespace prefix ("models/x" -> "x").
    pub fn short_name(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }
}

/// The remote completion service.
#[async_trait]
pub trait ModelService: Send + Sync {
    async fn list_models(&self) -> Result<Vec<ModelDescriptor>, ServiceError>;

    async fn generate_content(&self, model: &str, prompt: &str) -> Result<String, ServiceError>;
}

/// Gemini request types
#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

/// Gemini response types
#[derive(Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<RawModel>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawModel {
    name: String,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

impl From<RawModel> for ModelDescriptor {
    fn from(raw: RawModel) -> Self {
        Self {
            supports_generation: raw
                .supported_generation_methods
                .iter()
                .any(|m| m == GENERATE_METHOD),
            name: raw.name,
        }
    }
}

/// HTTP client for the Generative Language REST API.
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    credential: ApiCredential,
}

impl GeminiClient {
    pub fn new(base_url: &str, credential: ApiCredential) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            credential,
        }
    }

    async fn checked(resp: reqwest::Response) -> Result<reqwest::Response, ServiceError> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        Err(ServiceError::Api { status, body })
    }
}

#[async_trait]
impl ModelService for GeminiClient {
    async fn list_models(&self) -> Result<Vec<ModelDescriptor>, ServiceError> {
        let url = format!("{}/v1beta/models", self.base_url);
        let page_size = LIST_PAGE_SIZE.to_string();
        let mut models = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![("pageSize", page_size.as_str())];
            if let Some(ref token) = page_token {
                query.push(("pageToken", token.as_str()));
            }

            let resp = self
                .http
                .get(&url)
                .header(API_KEY_HEADER, self.credential.expose())
                .query(&query)
                .send()
                .await?;
            let page: ListModelsResponse = Self::checked(resp).await?.json().await?;
            models.extend(page.models.into_iter().map(ModelDescriptor::from));

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        log::debug!("Gemini listed {} models", models.len());
        Ok(models)
    }

    async fn generate_content(&self, model: &str, prompt: &str) -> Result<String, ServiceError> {
        let url = format!("{}/v1beta/{model}:{GENERATE_METHOD}", self.base_url);
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let resp = self
            .http
            .post(&url)
            .header(API_KEY_HEADER, self.credential.expose())
            .json(&body)
            .send()
            .await?;
        let resp: GenerateResponse = Self::checked(resp).await?.json().await?;

        let text = resp
            .candidates
            .and_then(|c| c.into_iter().next())
            .and_then(|c| c.content)
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .filter(|t| !t.trim().is_empty())
            .ok_or(ServiceError::EmptyResponse)?;

        Ok(text)
    }
}
