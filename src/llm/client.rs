//! Blocking HTTP client for chat / vision completions.
//!
//! One request shape (`ChatRequest`) is translated into each provider's wire
//! format. Failures of any kind come back as `SolverError::Provider`; nothing
//! is retried.

use base64::{Engine, engine::general_purpose::STANDARD};
use serde_json::{Value, json};
use std::time::Duration;

use super::ProviderKind;
use crate::config::{AppConfig, ModelSettings};
use crate::error::{SolverError, SolverResult};

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Returns the explicit key, or the provider's environment variable.
pub fn resolve_api_key(kind: ProviderKind, explicit: Option<String>) -> Option<String> {
    explicit
        .filter(|key| !key.trim().is_empty())
        .or_else(|| std::env::var(kind.env_var()).ok())
        .filter(|key| !key.trim().is_empty())
}

/// Everything needed to talk to one provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub api_key: String,
    pub settings: ModelSettings,
    pub timeout: Option<Duration>,
}

impl ProviderConfig {
    pub fn new(kind: ProviderKind, api_key: impl Into<String>, settings: ModelSettings) -> Self {
        Self {
            kind,
            api_key: api_key.into(),
            settings,
            timeout: None,
        }
    }

    pub fn from_app(kind: ProviderKind, api_key: impl Into<String>, config: &AppConfig) -> Self {
        Self {
            timeout: config.request_timeout_secs.map(Duration::from_secs),
            ..Self::new(kind, api_key, config.providers.get(kind).clone())
        }
    }

    fn endpoint(&self) -> &str {
        self.settings
            .endpoint
            .as_deref()
            .unwrap_or_else(|| self.kind.default_endpoint())
    }
}

/// An inline image attached to a request.
#[derive(Debug, Clone, Copy)]
pub struct ImagePayload<'a> {
    pub bytes: &'a [u8],
    pub mime_type: &'a str,
}

/// A single-turn request: system prompt, user text, optional image.
#[derive(Debug, Clone, Copy)]
pub struct ChatRequest<'a> {
    pub system: &'a str,
    pub user: &'a str,
    pub image: Option<ImagePayload<'a>>,
    /// Overrides the configured temperature
    pub temperature: Option<f64>,
}

impl<'a> ChatRequest<'a> {
    pub fn text(system: &'a str, user: &'a str) -> Self {
        Self {
            system,
            user,
            image: None,
            temperature: None,
        }
    }

    pub fn with_image(mut self, bytes: &'a [u8], mime_type: &'a str) -> Self {
        self.image = Some(ImagePayload { bytes, mime_type });
        self
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Provider client. Owns its configuration; there is no shared state.
pub struct LlmClient {
    config: ProviderConfig,
    http: reqwest::blocking::Client,
}

impl LlmClient {
    pub fn new(config: ProviderConfig) -> SolverResult<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SolverError::provider(config.kind.name(), e.to_string()))?;
        Ok(Self { config, http })
    }

    pub fn kind(&self) -> ProviderKind {
        self.config.kind
    }

    pub fn settings(&self) -> &ModelSettings {
        &self.config.settings
    }

    /// Sends a whole image with the prompts and returns the raw reply text.
    pub fn describe_image(
        &self,
        system: &str,
        user: &str,
        image: &[u8],
        mime_type: &str,
    ) -> SolverResult<String> {
        self.send(&ChatRequest::text(system, user).with_image(image, mime_type))
    }

    /// Sends a request and returns the reply text.
    pub fn send(&self, request: &ChatRequest<'_>) -> SolverResult<String> {
        let kind = self.config.kind;
        let body = request_body(kind, &self.config.settings, request);

        log::info!(
            "Calling {} ({}){}",
            kind,
            self.config.settings.model,
            if request.image.is_some() { " with image" } else { "" }
        );

        let builder = match kind {
            ProviderKind::OpenAi => self
                .http
                .post(self.config.endpoint())
                .bearer_auth(&self.config.api_key),
            ProviderKind::Claude => self
                .http
                .post(self.config.endpoint())
                .header("x-api-key", &self.config.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION),
            ProviderKind::Gemini => {
                let url = format!(
                    "{}/models/{}:generateContent",
                    self.config.endpoint().trim_end_matches('/'),
                    self.config.settings.model
                );
                self.http
                    .post(url)
                    .header("x-goog-api-key", &self.config.api_key)
            }
        };

        let provider_error = |message: String| SolverError::provider(kind.name(), message);

        let response = builder
            .json(&body)
            .send()
            .map_err(|e| provider_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            return Err(provider_error(format!("HTTP {}: {}", status, text.trim())));
        }

        let json: Value = response
            .json()
            .map_err(|e| provider_error(format!("invalid response body: {}", e)))?;

        let reply = reply_text(kind, &json)
            .ok_or_else(|| provider_error("response contained no text".to_string()))?;

        log::debug!("{} replied with {} chars", kind, reply.len());
        Ok(reply)
    }
}

/// Builds the provider-specific JSON body.
pub fn request_body(kind: ProviderKind, settings: &ModelSettings, request: &ChatRequest<'_>) -> Value {
    let temperature = request.temperature.or(settings.temperature);
    let image = request
        .image
        .map(|img| (img.mime_type, STANDARD.encode(img.bytes)));

    match kind {
        ProviderKind::OpenAi => {
            let user_content = match &image {
                Some((mime, b64)) => json!([
                    { "type": "text", "text": request.user },
                    { "type": "image_url",
                      "image_url": { "url": format!("data:{};base64,{}", mime, b64) } }
                ]),
                None => json!(request.user),
            };
            let mut body = json!({
                "model": settings.model,
                "messages": [
                    { "role": "system", "content": request.system },
                    { "role": "user", "content": user_content }
                ],
                "max_tokens": settings.max_tokens
            });
            if let Some(t) = temperature {
                body["temperature"] = json!(t);
            }
            body
        }
        ProviderKind::Claude => {
            let mut content = vec![json!({ "type": "text", "text": request.user })];
            if let Some((mime, b64)) = &image {
                content.push(json!({
                    "type": "image",
                    "source": { "type": "base64", "media_type": mime, "data": b64 }
                }));
            }
            let mut body = json!({
                "model": settings.model,
                "max_tokens": settings.max_tokens,
                "system": request.system,
                "messages": [{ "role": "user", "content": content }]
            });
            if let Some(t) = temperature {
                body["temperature"] = json!(t);
            }
            body
        }
        ProviderKind::Gemini => {
            let mut parts = vec![json!({ "text": request.user })];
            if let Some((mime, b64)) = &image {
                parts.push(json!({ "inlineData": { "mimeType": mime, "data": b64 } }));
            }
            let mut generation = json!({
                "maxOutputTokens": settings.max_tokens,
                "topP": 0.95
            });
            if let Some(t) = temperature {
                generation["temperature"] = json!(t);
            }
            json!({
                "systemInstruction": { "parts": [{ "text": request.system }] },
                "contents": [{ "role": "user", "parts": parts }],
                "generationConfig": generation
            })
        }
    }
}

/// Pulls the reply text out of a provider response. Multi-part replies are
/// concatenated.
pub fn reply_text(kind: ProviderKind, json: &Value) -> Option<String> {
    let text = match kind {
        ProviderKind::OpenAi => json["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string),
        ProviderKind::Claude => json["content"].as_array().map(|blocks| {
            blocks
                .iter()
                .filter(|b| b["type"] == "text")
                .filter_map(|b| b["text"].as_str())
                .collect::<String>()
        }),
        ProviderKind::Gemini => json["candidates"][0]["content"]["parts"]
            .as_array()
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|p| p["text"].as_str())
                    .collect::<String>()
            }),
    };
    text.filter(|t| !t.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn settings(model: &str, temperature: Option<f64>) -> ModelSettings {
        ModelSettings {
            model: model.to_string(),
            endpoint: None,
            max_tokens: 100,
            temperature,
        }
    }

    fn client_for(kind: ProviderKind, endpoint: String) -> LlmClient {
        let mut s = settings("test-model", Some(0.2));
        s.endpoint = Some(endpoint);
        LlmClient::new(ProviderConfig::new(kind, "test-key", s)).unwrap()
    }

    #[test]
    fn test_openai_text_body() {
        let request = ChatRequest::text("sys", "user");
        let body = request_body(ProviderKind::OpenAi, &settings("gpt-4", Some(0.2)), &request);
        assert_eq!(
            body,
            json!({
                "model": "gpt-4",
                "messages": [
                    { "role": "system", "content": "sys" },
                    { "role": "user", "content": "user" }
                ],
                "max_tokens": 100,
                "temperature": 0.2
            })
        );
    }

    #[test]
    fn test_openai_image_body_uses_data_url() {
        let request = ChatRequest::text("sys", "look").with_image(b"abc", "image/png");
        let body = request_body(ProviderKind::OpenAi, &settings("gpt-4o", None), &request);
        assert_eq!(
            body["messages"][1]["content"][1]["image_url"]["url"],
            "data:image/png;base64,YWJj"
        );
        assert!(body.get("temperature").is_none());
    }

    #[test]
    fn test_claude_body_has_top_level_system_and_image_block() {
        let request = ChatRequest::text("sys", "look").with_image(b"abc", "image/jpeg");
        let body = request_body(ProviderKind::Claude, &settings("claude", None), &request);
        assert_eq!(body["system"], "sys");
        assert_eq!(body["messages"][0]["content"][0]["text"], "look");
        assert_eq!(body["messages"][0]["content"][1]["source"]["media_type"], "image/jpeg");
        assert_eq!(body["messages"][0]["content"][1]["source"]["data"], "YWJj");
    }

    #[test]
    fn test_gemini_body_and_request_temperature_override() {
        let request = ChatRequest::text("sys", "look")
            .with_image(b"abc", "image/png")
            .temperature(0.1);
        let body = request_body(ProviderKind::Gemini, &settings("gemini", Some(0.4)), &request);
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "sys");
        assert_eq!(body["contents"][0]["parts"][1]["inlineData"]["data"], "YWJj");
        assert_eq!(body["generationConfig"]["temperature"], 0.1);
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 100);
    }

    #[test]
    fn test_reply_text_per_provider() {
        let openai = json!({ "choices": [{ "message": { "content": "hi" } }] });
        assert_eq!(reply_text(ProviderKind::OpenAi, &openai).as_deref(), Some("hi"));

        let claude = json!({ "content": [
            { "type": "text", "text": "a" },
            { "type": "tool_use", "id": "x" },
            { "type": "text", "text": "b" }
        ]});
        assert_eq!(reply_text(ProviderKind::Claude, &claude).as_deref(), Some("ab"));

        let gemini = json!({ "candidates": [{ "content": { "parts": [{ "text": "g1" }, { "text": "g2" }] } }] });
        assert_eq!(reply_text(ProviderKind::Gemini, &gemini).as_deref(), Some("g1g2"));

        assert_eq!(reply_text(ProviderKind::OpenAi, &json!({ "choices": [] })), None);
        assert_eq!(reply_text(ProviderKind::Claude, &json!({ "content": [] })), None);
    }

    #[test]
    fn test_resolve_api_key_prefers_explicit() {
        assert_eq!(
            resolve_api_key(ProviderKind::OpenAi, Some("explicit".to_string())).as_deref(),
            Some("explicit")
        );
    }

    #[test]
    fn test_openai_round_trip_over_http() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"content":"```python\nprint(1)\n```"}}]}"#)
            .create();

        let client = client_for(
            ProviderKind::OpenAi,
            format!("{}/v1/chat/completions", server.url()),
        );
        let reply = client.send(&ChatRequest::text("sys", "user")).unwrap();

        assert_eq!(reply, "```python\nprint(1)\n```");
        mock.assert();
    }

    #[test]
    fn test_claude_sends_key_headers() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/v1/messages")
            .match_header("x-api-key", "test-key")
            .match_header("anthropic-version", ANTHROPIC_VERSION)
            .with_status(200)
            .with_body(r#"{"content":[{"type":"text","text":"{\"solution\":\"pass\"}"}]}"#)
            .create();

        let client = client_for(ProviderKind::Claude, format!("{}/v1/messages", server.url()));
        let reply = client.describe_image("sys", "user", b"img", "image/png").unwrap();

        assert_eq!(reply, r#"{"solution":"pass"}"#);
        mock.assert();
    }

    #[test]
    fn test_gemini_posts_to_model_path() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/models/test-model:generateContent")
            .match_header("x-goog-api-key", "test-key")
            .with_status(200)
            .with_body(r#"{"candidates":[{"content":{"parts":[{"text":"ok"}]}}]}"#)
            .create();

        let client = client_for(ProviderKind::Gemini, server.url());
        assert_eq!(client.send(&ChatRequest::text("sys", "user")).unwrap(), "ok");
        mock.assert();
    }

    #[test]
    fn test_http_error_is_provider_error() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(401)
            .with_body("invalid api key")
            .create();

        let client = client_for(
            ProviderKind::OpenAi,
            format!("{}/v1/chat/completions", server.url()),
        );
        let err = client.send(&ChatRequest::text("sys", "user")).unwrap_err();

        match err {
            SolverError::Provider { provider, message } => {
                assert_eq!(provider, "OpenAI");
                assert!(message.contains("401"));
                assert!(message.contains("invalid api key"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_reply_is_provider_error() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[{"message":{"content":"  "}}]}"#)
            .create();

        let client = client_for(
            ProviderKind::OpenAi,
            format!("{}/v1/chat/completions", server.url()),
        );
        assert!(matches!(
            client.send(&ChatRequest::text("sys", "user")),
            Err(SolverError::Provider { .. })
        ));
    }
}
