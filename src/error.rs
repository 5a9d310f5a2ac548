use reqwest::StatusCode;
use thiserror::Error;

/// Failures talking to the remote model service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("network error: {0}")]
    Transport(reqwest::Error),
    #[error("Gemini API error {status}: {body}")]
    Api { status: StatusCode, body: String },
    #[error("Gemini returned no text")]
    EmptyResponse,
}

/// Request URLs are dropped so nothing sensitive reaches the UI or logs.
impl From<reqwest::Error> for ServiceError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.without_url())
    }
}

impl ServiceError {
    /// HTTP 429 (as status or in the text), or anything mentioning a quota.
    pub fn is_rate_limit(&self) -> bool {
        let status = match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status(),
            Self::EmptyResponse => None,
        };
        let text = self.to_string().to_lowercase();
        status == Some(StatusCode::TOO_MANY_REQUESTS)
            || text.contains("429")
            || text.contains("quota")
    }
}

#[derive(Debug, Error)]
pub enum RecognizerError {
    #[error("GOOGLE_API_KEY not found in environment or .env file")]
    MissingCredential,
    #[error("Please enter song details to search!")]
    EmptyInput,
    #[error("A recognition request is already running")]
    Busy,
    #[error("No compatible models found. Please check your API key.")]
    NoModelAvailable,
    #[error("rate limit exceeded after {attempts} attempts")]
    RateLimited { attempts: u32 },
    #[error(transparent)]
    Service(#[from] ServiceError),
}
