use std::{fmt, time::Duration};

use serde_json::{json, Value};

use crate::AdvisoryError;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for the remote text-generation service.
#[derive(Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    api_key: String,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl RemoteConfig {
    /// Creates a configuration targeting the public endpoint with default model.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_owned(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Overrides the model name.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Overrides the service base URL; a trailing slash is ignored.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    /// Overrides the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Endpoint receiving generation requests.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

impl fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Advisor backed by a remote `generateContent` endpoint.
#[derive(Debug)]
pub struct RemoteAdvisor {
    config: RemoteConfig,
    agent: ureq::Agent,
}

impl RemoteAdvisor {
    /// Creates an advisor issuing blocking requests with the configured timeout.
    #[must_use]
    pub fn new(config: RemoteConfig) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(config.timeout).build();
        Self { config, agent }
    }

    pub(crate) fn generate(&self, prompt: &str) -> Result<String, AdvisoryError> {
        let body = request_body(prompt).to_string();
        let response = self
            .agent
            .post(&self.config.endpoint())
            .set("Content-Type", "application/json")
            .set("x-goog-api-key", &self.config.api_key)
            .send_string(&body)
            .map_err(|error| match error {
                ureq::Error::Status(429, _) => AdvisoryError::RateLimited,
                ureq::Error::Status(code, _) => AdvisoryError::Status(code),
                ureq::Error::Transport(transport) => {
                    AdvisoryError::Transport(transport.to_string())
                }
            })?;

        let text = response
            .into_string()
            .map_err(|error| AdvisoryError::Malformed(error.to_string()))?;
        extract_text(&text)
    }
}

fn request_body(prompt: &str) -> Value {
    json!({
        "contents": [{ "parts": [{ "text": prompt }] }],
        "safetySettings": [
            { "category": "HARM_CATEGORY_HATE_SPEECH", "threshold": "BLOCK_LOW_AND_ABOVE" },
            { "category": "HARM_CATEGORY_HARASSMENT", "threshold": "BLOCK_LOW_AND_ABOVE" },
            { "category": "HARM_CATEGORY_DANGEROUS_CONTENT", "threshold": "BLOCK_ONLY_HIGH" },
        ],
    })
}

/// Joins the text parts of the first candidate.
fn extract_text(body: &str) -> Result<String, AdvisoryError> {
    let json: Value =
        serde_json::from_str(body).map_err(|error| AdvisoryError::Malformed(error.to_string()))?;

    let parts = json["candidates"][0]["content"]["parts"]
        .as_array()
        .ok_or_else(|| AdvisoryError::Malformed("missing candidate parts".to_owned()))?;

    let text: String = parts
        .iter()
        .filter_map(|part| part["text"].as_str())
        .collect();
    let text = text.trim();
    if text.is_empty() {
        return Err(AdvisoryError::Empty);
    }
    Ok(text.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_base_url_and_model() {
        let config = RemoteConfig::new("key")
            .with_base_url("http://127.0.0.1:9000/")
            .with_model("test-model");
        assert_eq!(
            config.endpoint(),
            "http://127.0.0.1:9000/v1beta/models/test-model:generateContent"
        );
    }

    #[test]
    fn request_body_carries_prompt_and_safety_thresholds() {
        let body = request_body("hello");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hello");

        let settings = body["safetySettings"].as_array().expect("settings array");
        assert_eq!(settings.len(), 3);
        assert_eq!(settings[2]["category"], "HARM_CATEGORY_DANGEROUS_CONTENT");
        assert_eq!(settings[2]["threshold"], "BLOCK_ONLY_HIGH");
    }

    #[test]
    fn text_parts_are_joined_and_trimmed() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":" Packets "},{"text":"inbound. "}]}}]}"#;
        assert_eq!(extract_text(body), Ok("Packets inbound.".to_owned()));
    }

    #[test]
    fn missing_or_blank_text_is_rejected() {
        assert!(matches!(
            extract_text(r#"{"candidates":[]}"#),
            Err(AdvisoryError::Malformed(_))
        ));
        assert!(matches!(
            extract_text("not json"),
            Err(AdvisoryError::Malformed(_))
        ));
        assert_eq!(
            extract_text(r#"{"candidates":[{"content":{"parts":[{"text":"   "}]}}]}"#),
            Err(AdvisoryError::Empty)
        );
    }
}
