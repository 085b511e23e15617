use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use tracing::instrument;

use alttext_core::errors::GeneratorError;
use alttext_core::generator::{AltTextGenerator, DescribeRequest, DEFAULT_MODEL};
use alttext_core::security::ApiKey;

use crate::converter::{self, ChatResponse, SamplingParams};
use crate::models;

pub use alttext_core::generator::DEFAULT_BASE_URL;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Endpoint, model and sampling for a [`ChatCompletionsProvider`].
#[derive(Clone, Debug)]
pub struct ProviderConfig {
    pub base_url: String,
    pub model: String,
    pub sampling: SamplingParams,
    /// Transport guard for a hung connection. Not a retry policy.
    pub request_timeout: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            sampling: SamplingParams::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Alt-text generator backed by any OpenAI-compatible `/chat/completions`
/// endpoint with image input (Groq by default).
///
/// Construct once and share; the inner HTTP client pools connections.
pub struct ChatCompletionsProvider {
    client: Client,
    endpoint: String,
    api_key: Option<ApiKey>,
    config: ProviderConfig,
}

impl ChatCompletionsProvider {
    pub fn new(config: ProviderConfig, api_key: Option<ApiKey>) -> Result<Self, GeneratorError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| GeneratorError::NetworkError(e.to_string()))?;

        let mut config = config;
        if let Some(info) = models::find_model(&config.model) {
            config.sampling.max_tokens = config.sampling.max_tokens.min(info.max_output);
        }

        Ok(Self {
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            client,
            api_key,
            config,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn map_send_error(&self, err: reqwest::Error) -> GeneratorError {
        if err.is_timeout() {
            GeneratorError::Timeout(self.config.request_timeout)
        } else {
            GeneratorError::NetworkError(err.to_string())
        }
    }
}

#[async_trait]
impl AltTextGenerator for ChatCompletionsProvider {
    fn name(&self) -> &str {
        models::find_model(&self.config.model)
            .map(|m| m.provider)
            .unwrap_or("openai-compatible")
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    #[instrument(skip(self, request), fields(model = %self.config.model))]
    async fn describe(&self, request: &DescribeRequest) -> Result<String, GeneratorError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| GeneratorError::AuthenticationFailed("no API key configured".into()))?;

        let body = converter::build_request_body(request, &self.config.model, &self.config.sampling);

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key.0.expose_secret())
            .header("accept", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(GeneratorError::from_status(status, body));
        }

        let parsed: ChatResponse = resp
            .json()
            .await
            .map_err(|e| GeneratorError::MalformedResponse(e.to_string()))?;

        let text = converter::extract_text(&parsed);
        tracing::debug!(chars = text.len(), "description received");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> ProviderConfig {
        ProviderConfig {
            base_url: server.uri(),
            ..Default::default()
        }
    }

    fn request() -> DescribeRequest {
        DescribeRequest::new("https://img/dog.png", "Describe for accessibility:")
    }

    #[test]
    fn endpoint_joins_base_url() {
        let provider = ChatCompletionsProvider::new(
            ProviderConfig {
                base_url: "https://example.test/v1/".into(),
                ..Default::default()
            },
            None,
        )
        .unwrap();
        assert_eq!(provider.endpoint(), "https://example.test/v1/chat/completions");
    }

    #[test]
    fn provider_properties() {
        let provider = ChatCompletionsProvider::new(ProviderConfig::default(), None).unwrap();
        assert_eq!(provider.name(), "groq");
        assert_eq!(provider.model(), "meta-llama/llama-4-scout-17b-16e-instruct");
        assert!(!provider.has_api_key());

        let custom = ChatCompletionsProvider::new(
            ProviderConfig {
                model: "local-llava".into(),
                ..Default::default()
            },
            None,
        )
        .unwrap();
        assert_eq!(custom.name(), "openai-compatible");
    }

    #[tokio::test]
    async fn describe_returns_trimmed_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer gsk_test"))
            .and(body_partial_json(json!({
                "model": "meta-llama/llama-4-scout-17b-16e-instruct",
                "stream": false,
                "max_tokens": 200,
                "messages": [{
                    "role": "user",
                    "content": [
                        {"type": "text", "text": "Describe for accessibility:"},
                        {"type": "image_url", "image_url": {"url": "https://img/dog.png"}}
                    ]
                }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "  A dog running on grass.  "}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider =
            ChatCompletionsProvider::new(config_for(&server), Some(ApiKey::new("gsk_test"))).unwrap();
        let text = provider.describe(&request()).await.unwrap();
        assert_eq!(text, "A dog running on grass.");
    }

    #[tokio::test]
    async fn describe_empty_choices_is_empty_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let provider =
            ChatCompletionsProvider::new(config_for(&server), Some(ApiKey::new("k"))).unwrap();
        assert_eq!(provider.describe(&request()).await.unwrap(), "");
    }

    #[tokio::test]
    async fn describe_maps_http_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
            .mount(&server)
            .await;

        let provider =
            ChatCompletionsProvider::new(config_for(&server), Some(ApiKey::new("bad"))).unwrap();
        match provider.describe(&request()).await {
            Err(GeneratorError::AuthenticationFailed(body)) => assert_eq!(body, "invalid api key"),
            other => panic!("expected AuthenticationFailed, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn describe_rejects_non_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let provider =
            ChatCompletionsProvider::new(config_for(&server), Some(ApiKey::new("k"))).unwrap();
        assert!(matches!(
            provider.describe(&request()).await,
            Err(GeneratorError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn describe_without_key_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let provider = ChatCompletionsProvider::new(config_for(&server), None).unwrap();
        assert!(matches!(
            provider.describe(&request()).await,
            Err(GeneratorError::AuthenticationFailed(_))
        ));
    }

    #[tokio::test]
    async fn describe_unreachable_host_is_network_error() {
        let provider = ChatCompletionsProvider::new(
            ProviderConfig {
                base_url: "http://127.0.0.1:9".into(),
                ..Default::default()
            },
            Some(ApiKey::new("k")),
        )
        .unwrap();
        let err = provider.describe(&request()).await.unwrap_err();
        assert_eq!(err.error_kind(), "network_error");
    }
}
