use std::sync::{Arc, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;

use crate::config::{Config, RetryPolicy};
use crate::error::RecognizerError;
use crate::gemini::{ModelDescriptor, ModelService};
use crate::prompt::build_prompt;

const QUOTA_EXCEEDED_REPORT: &str = "\u{274C} Rate Limit Exceeded

You've reached the free tier quota limit.

\u{1F4A1} Solutions:
1. Wait a few minutes and try again
2. The free tier resets every 24 hours
3. Current limit: 15 requests/minute, 1500 requests/day
4. Monitor usage at: https://ai.dev/usage

\u{23F0} Please try again in a few minutes.";

/// Upper bound on a single backoff, whatever the server suggests.
const MAX_BACKOFF_SECS: u64 = 600;

const REMEDIATION: &str = "\u{1F4A1} Solution:
1. Make sure your API key is from: https://aistudio.google.com/app/apikey
2. Verify the key in your .env file
3. Check internet connection";

/// Outcome of one submission. Exactly one is produced per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionResult {
    /// Markup-annotated song description.
    Identified(String),
    /// Human-readable diagnostic.
    Failed(String),
}

impl RecognitionResult {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Identified(text) | Self::Failed(text) => text,
        }
    }
}

/// Waits between attempts.
#[async_trait]
pub trait Pause: Send + Sync {
    async fn pause(&self, duration: Duration);
}

pub struct TokioPause;

#[async_trait]
impl Pause for TokioPause {
    async fn pause(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

fn retry_hint_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"retry in (\d+(?:\.\d+)?)").expect("valid retry pattern"))
}

/// Whole seconds from a "retry in <n>" hint in an error message.
pub fn parse_retry_hint(text: &str) -> Option<u64> {
    let caps = retry_hint_pattern().captures(text)?;
    let secs: f64 = caps[1].parse().ok()?;
    Some(secs.floor() as u64)
}

impl RetryPolicy {
    /// Backoff before the next attempt: hint plus margin, or the default.
    /// Never longer than `MAX_BACKOFF_SECS`.
    pub fn wait_for(&self, error_text: &str) -> Duration {
        let secs = match parse_retry_hint(error_text) {
            Some(hint) => hint.saturating_add(self.hint_margin_secs),
            None => self.default_wait_secs,
        };
        Duration::from_secs(secs.min(MAX_BACKOFF_SECS))
    }
}

/// Pick a generation-capable model, preferring names containing `keyword`.
pub fn select_model<'a>(
    models: &'a [ModelDescriptor],
    keyword: &str,
) -> Result<&'a ModelDescriptor, RecognizerError> {
    let keyword = keyword.to_lowercase();
    let mut available = models.iter().filter(|m| m.supports_generation).peekable();
    let first = *available.peek().ok_or(RecognizerError::NoModelAvailable)?;

    Ok(available
        .find(|m| m.name.to_lowercase().contains(&keyword))
        .unwrap_or(first))
}

/// Text shown in the output panel for a terminal failure.
pub fn failure_report(err: &RecognizerError) -> String {
    match err {
        RecognizerError::RateLimited { .. } => QUOTA_EXCEEDED_REPORT.to_string(),
        other => format!("\u{274C} Error: {other}\n\n{REMEDIATION}"),
    }
}

/// Identifies songs through a remote completion model.
pub struct Recognizer {
    service: Arc<dyn ModelService>,
    pause: Arc<dyn Pause>,
    policy: RetryPolicy,
    preferred_keyword: String,
}

impl Recognizer {
    pub fn new(service: Arc<dyn ModelService>, pause: Arc<dyn Pause>, config: &Config) -> Self {
        Self {
            service,
            pause,
            policy: config.retry.clone(),
            preferred_keyword: config.preferred_model_keyword.clone(),
        }
    }

    /// Run the request to completion, retrying rate limits. Never fails:
    /// every error becomes a `RecognitionResult::Failed`.
    pub async fn recognize(
        &self,
        query: &str,
        on_status: &(dyn Fn(String) + Send + Sync),
    ) -> RecognitionResult {
        match self.recognize_with_retry(query, on_status).await {
            Ok(text) => RecognitionResult::Identified(text),
            Err(e) => {
                log::error!("Recognition failed: {e}");
                RecognitionResult::Failed(failure_report(&e))
            }
        }
    }

    async fn recognize_with_retry(
        &self,
        query: &str,
        on_status: &(dyn Fn(String) + Send + Sync),
    ) -> Result<String, RecognizerError> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            log::info!("Recognition attempt {attempt}/{max_attempts}");

            let err = match self.attempt(query, on_status).await {
                Ok(text) => return Ok(text),
                Err(RecognizerError::Service(e)) if e.is_rate_limit() => e,
                Err(e) => return Err(e),
            };

            if attempt >= max_attempts {
                log::warn!("Rate limited on final attempt: {err}");
                return Err(RecognizerError::RateLimited {
                    attempts: max_attempts,
                });
            }

            let wait = self.policy.wait_for(&err.to_string());
            log::warn!("Rate limited, backing off {}s: {err}", wait.as_secs());
            on_status(format!(
                "\u{23F3} Rate limit hit. Waiting {} seconds... (Attempt {attempt}/{max_attempts})",
                wait.as_secs()
            ));
            self.pause.pause(wait).await;
        }
    }

    async fn attempt(
        &self,
        query: &str,
        on_status: &(dyn Fn(String) + Send + Sync),
    ) -> Result<String, RecognizerError> {
        let models = self.service.list_models().await?;
        let model = select_model(&models, &self.preferred_keyword)?;
        log::info!("Using model {}", model.name);
        on_status(format!("\u{1F3B5} Using AI model: {}...", model.short_name()));

        let prompt = build_prompt(query);
        Ok(self.service.generate_content(&model.name, &prompt).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use reqwest::StatusCode;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    fn model(name: &str, supports_generation: bool) -> ModelDescriptor {
        ModelDescriptor {
            name: name.into(),
            supports_generation,
        }
    }

    fn rate_limited(body: &str) -> ServiceError {
        ServiceError::Api {
            status: StatusCode::TOO_MANY_REQUESTS,
            body: body.into(),
        }
    }

    /// Serves a fixed model list and a scripted sequence of generate outcomes.
    struct FakeService {
        models: Vec<ModelDescriptor>,
        replies: Mutex<VecDeque<Result<String, ServiceError>>>,
        prompts: Mutex<Vec<(String, String)>>,
    }

    impl FakeService {
        fn new(
            models: Vec<ModelDescriptor>,
            replies: Vec<Result<String, ServiceError>>,
        ) -> Arc<Self> {
            Arc::new(Self {
                models,
                replies: Mutex::new(replies.into()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ModelService for FakeService {
        async fn list_models(&self) -> Result<Vec<ModelDescriptor>, ServiceError> {
            Ok(self.models.clone())
        }

        async fn generate_content(
            &self,
            model: &str,
            prompt: &str,
        ) -> Result<String, ServiceError> {
            self.prompts
                .lock()
                .unwrap()
                .push((model.to_string(), prompt.to_string()));
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(ServiceError::EmptyResponse))
        }
    }

    #[derive(Default)]
    struct RecordingPause {
        waits: Mutex<Vec<Duration>>,
    }

    #[async_trait]
    impl Pause for RecordingPause {
        async fn pause(&self, duration: Duration) {
            self.waits.lock().unwrap().push(duration);
        }
    }

    struct Harness {
        service: Arc<FakeService>,
        pause: Arc<RecordingPause>,
        recognizer: Recognizer,
        statuses: Arc<Mutex<Vec<String>>>,
    }

    impl Harness {
        fn new(replies: Vec<Result<String, ServiceError>>) -> Self {
            let service = FakeService::new(
                vec![
                    model("models/gemini-pro", true),
                    model("models/gemini-2.5-flash", true),
                ],
                replies,
            );
            let pause = Arc::new(RecordingPause::default());
            let recognizer = Recognizer::new(service.clone(), pause.clone(), &Config::default());
            Self {
                service,
                pause,
                recognizer,
                statuses: Arc::new(Mutex::new(Vec::new())),
            }
        }

        async fn run(&self, query: &str) -> RecognitionResult {
            let statuses = self.statuses.clone();
            let report = move |msg: String| statuses.lock().unwrap().push(msg);
            self.recognizer.recognize(query, &report).await
        }

        fn waits(&self) -> Vec<Duration> {
            self.pause.waits.lock().unwrap().clone()
        }
    }

    #[test]
    fn retry_hint_adds_margin() {
        let policy = RetryPolicy::default();
        assert_eq!(
            policy.wait_for("Please retry in 15 seconds"),
            Duration::from_secs(17)
        );
        assert_eq!(
            policy.wait_for("Please retry in 15.928s."),
            Duration::from_secs(17)
        );
    }

    #[test]
    fn oversized_hint_is_capped() {
        let policy = RetryPolicy::default();
        assert_eq!(
            policy.wait_for("Please retry in 9999999999999999999999999 seconds"),
            Duration::from_secs(MAX_BACKOFF_SECS)
        );
        assert_eq!(
            policy.wait_for("retry in 18446744073709551615"),
            Duration::from_secs(MAX_BACKOFF_SECS)
        );
    }

    #[test]
    fn missing_hint_uses_default_wait() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.wait_for("quota exceeded"), Duration::from_secs(20));
        assert_eq!(policy.wait_for("retry in soon"), Duration::from_secs(20));
    }

    #[test]
    fn flash_model_is_preferred() {
        let models = vec![
            model("models/x-pro", true),
            model("models/y-flash-lite", true),
        ];
        assert_eq!(
            select_model(&models, "flash").unwrap().name,
            "models/y-flash-lite"
        );
    }

    #[test]
    fn preference_is_case_insensitive() {
        let models = vec![model("models/a", true), model("models/B-FLASH", true)];
        assert_eq!(select_model(&models, "flash").unwrap().name, "models/B-FLASH");
    }

    #[test]
    fn first_model_wins_without_flash() {
        let models = vec![
            model("models/embed-flash", false),
            model("models/x-pro", true),
            model("models/z-ultra", true),
        ];
        assert_eq!(select_model(&models, "flash").unwrap().name, "models/x-pro");
    }

    #[test]
    fn no_generation_models_is_an_error() {
        let models = vec![model("models/embedding-001", false)];
        assert!(matches!(
            select_model(&models, "flash"),
            Err(RecognizerError::NoModelAvailable)
        ));
        assert!(matches!(
            select_model(&[], "flash"),
            Err(RecognizerError::NoModelAvailable)
        ));
    }

    #[tokio::test]
    async fn success_returns_text_on_first_attempt() {
        let h = Harness::new(vec![Ok("**Song Name:** Tum Hi Ho".into())]);

        let result = h.run("tum hi ho").await;

        assert_eq!(
            result,
            RecognitionResult::Identified("**Song Name:** Tum Hi Ho".into())
        );
        assert_eq!(h.service.calls(), 1);
        assert!(h.waits().is_empty());

        let prompts = h.service.prompts.lock().unwrap();
        assert_eq!(prompts[0].0, "models/gemini-2.5-flash");
        assert!(prompts[0].1.contains("\"tum hi ho\""));
        assert_eq!(
            h.statuses.lock().unwrap().as_slice(),
            ["\u{1F3B5} Using AI model: gemini-2.5-flash...".to_string()]
        );
    }

    #[tokio::test]
    async fn rate_limit_then_success_retries_once() {
        let h = Harness::new(vec![
            Err(rate_limited("Please retry in 3.2s.")),
            Ok("found it".into()),
        ]);

        let result = h.run("q").await;

        assert_eq!(result, RecognitionResult::Identified("found it".into()));
        assert_eq!(h.service.calls(), 2);
        assert_eq!(h.waits(), vec![Duration::from_secs(5)]);
        assert!(h
            .statuses
            .lock()
            .unwrap()
            .iter()
            .any(|s| s.contains("Waiting 5 seconds... (Attempt 1/3)")));
    }

    #[tokio::test]
    async fn exhausted_rate_limits_return_quota_report() {
        let h = Harness::new(vec![
            Err(rate_limited("retry in 15 seconds")),
            Err(rate_limited("no hint")),
            Err(rate_limited("retry in 1")),
        ]);

        let result = h.run("q").await;

        assert_eq!(
            result,
            RecognitionResult::Failed(QUOTA_EXCEEDED_REPORT.to_string())
        );
        assert_eq!(h.service.calls(), 3);
        assert_eq!(
            h.waits(),
            vec![Duration::from_secs(17), Duration::from_secs(20)]
        );
    }

    #[tokio::test]
    async fn quota_text_counts_as_rate_limit() {
        let quota = ServiceError::Api {
            status: StatusCode::FORBIDDEN,
            body: "Quota exceeded for metric".into(),
        };
        let h = Harness::new(vec![Err(quota), Ok("ok".into())]);

        assert_eq!(h.run("q").await, RecognitionResult::Identified("ok".into()));
        assert_eq!(h.waits().len(), 1);
    }

    #[tokio::test]
    async fn other_errors_fail_immediately() {
        let bad_key = ServiceError::Api {
            status: StatusCode::BAD_REQUEST,
            body: "API key not valid".into(),
        };
        let h = Harness::new(vec![Err(bad_key), Ok("never".into())]);

        let result = h.run("q").await;

        assert!(result.is_error());
        assert!(result.text().contains("API key not valid"));
        assert!(result.text().contains("aistudio.google.com"));
        assert_eq!(h.service.calls(), 1);
        assert!(h.waits().is_empty());
    }

    #[tokio::test]
    async fn no_model_fails_before_prompting() {
        let service = FakeService::new(vec![model("models/embedding-001", false)], vec![]);
        let pause = Arc::new(RecordingPause::default());
        let recognizer = Recognizer::new(service.clone(), pause.clone(), &Config::default());

        let result = recognizer.recognize("q", &|_: String| {}).await;

        assert!(result.is_error());
        assert!(result.text().contains("No compatible models found"));
        assert_eq!(service.calls(), 0);
        assert!(pause.waits.lock().unwrap().is_empty());
    }
}
