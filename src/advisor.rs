//! Genre classification and reading recommendations from a chat-completion model.
//!
//! The advisor is best effort: [`GenreAdvisor::advise`] always yields a printable
//! string, whether that is the model's answer or a short diagnostic.

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Excerpts shorter than this are rejected without contacting the model.
pub const MIN_EXCERPT_CHARS: usize = 100;
/// Only this many leading characters of the excerpt are sent.
pub const MAX_EXCERPT_CHARS: usize = 1000;

pub const NO_API_KEY_MESSAGE: &str = "No OpenAI API key provided.";
pub const REQUEST_FAILED_MESSAGE: &str = "Error retrieving genre and similar authors.";

const SYSTEM_PROMPT: &str = "You are a literary expert and genre analyst.";

#[derive(Debug, Error)]
pub enum AdvisorError {
    #[error("Excerpt too short for genre analysis: need at least {min} characters, got {len}.", min = MIN_EXCERPT_CHARS)]
    ExcerptTooShort { len: usize },
    #[error("{msg}", msg = NO_API_KEY_MESSAGE)]
    MissingApiKey,
    #[error("{msg}", msg = REQUEST_FAILED_MESSAGE)]
    Transport(#[from] reqwest::Error),
    #[error("Unexpected response:\n{}", serde_json::to_string_pretty(.0).unwrap_or_default())]
    UnexpectedResponse(Value),
}

/// Where and how to ask for a genre.
#[derive(Debug, Clone, PartialEq)]
pub struct AdvisorConfig {
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Environment variable holding the bearer token.
    pub api_key_env: String,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.7,
            max_tokens: 400,
            api_key_env: "OPENAI_API_KEY".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Transport used by the advisor. Returns the decoded JSON body, whatever its status.
#[async_trait]
pub trait CompletionClient {
    async fn complete(
        &self,
        api_key: &str,
        request: &ChatCompletionRequest,
    ) -> Result<Value, AdvisorError>;
}

/// [`CompletionClient`] over HTTPS with `reqwest`.
pub struct HttpCompletionClient {
    client: Client,
    endpoint: String,
}

impl HttpCompletionClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl CompletionClient for HttpCompletionClient {
    async fn complete(
        &self,
        api_key: &str,
        request: &ChatCompletionRequest,
    ) -> Result<Value, AdvisorError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await?;
        debug!("completion endpoint answered {}", response.status());
        Ok(response.json::<Value>().await?)
    }
}

/// Reads the credential from `var`, treating an unset or blank value as absent.
pub fn api_key_from_env(var: &str) -> Option<String> {
    std::env::var(var)
        .ok()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
}

/// First [`MAX_EXCERPT_CHARS`] characters of `text`.
pub fn truncate_excerpt(text: &str) -> String {
    text.chars().take(MAX_EXCERPT_CHARS).collect()
}

pub fn genre_prompt(excerpt: &str) -> String {
    format!(
        r#"You are a literary analyst. Given the following excerpt of creative writing, determine the most likely genre. Be specific (e.g., "psychological horror", "space opera"). Also, recommend 3 authors or specific books that share a similar style or tone.

TEXT:
"""
{excerpt}
"""

GENRE AND RECOMMENDATIONS:"#
    )
}

pub struct GenreAdvisor<C> {
    client: C,
    config: AdvisorConfig,
    api_key: Option<String>,
}

impl GenreAdvisor<HttpCompletionClient> {
    /// HTTP advisor with the credential taken from `config.api_key_env`.
    pub fn from_env(config: AdvisorConfig) -> Self {
        let api_key = api_key_from_env(&config.api_key_env);
        let client = HttpCompletionClient::new(config.endpoint.clone());
        Self::new(client, config, api_key)
    }
}

impl<C: CompletionClient> GenreAdvisor<C> {
    pub fn new(client: C, config: AdvisorConfig, api_key: Option<String>) -> Self {
        Self {
            client,
            config,
            api_key,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn build_request(&self, text: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: genre_prompt(&truncate_excerpt(text)),
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        }
    }

    /// Asks the model for a genre and three recommendations.
    pub async fn request(&self, text: &str) -> Result<String, AdvisorError> {
        let len = text.chars().count();
        if len < MIN_EXCERPT_CHARS {
            return Err(AdvisorError::ExcerptTooShort { len });
        }
        let api_key = self.api_key.as_deref().ok_or(AdvisorError::MissingApiKey)?;

        let request = self.build_request(text);
        debug!(
            "requesting genre from {} ({} chars of excerpt)",
            self.config.model,
            len.min(MAX_EXCERPT_CHARS)
        );
        let body = self.client.complete(api_key, &request).await?;

        match body["choices"][0]["message"]["content"].as_str() {
            Some(content) if !content.is_empty() => Ok(content.to_string()),
            _ => Err(AdvisorError::UnexpectedResponse(body)),
        }
    }

    /// Like [`request`](Self::request), with failures rendered as their message.
    pub async fn advise(&self, text: &str) -> String {
        match self.request(text).await {
            Ok(answer) => answer,
            Err(e) => {
                if let AdvisorError::Transport(source) = &e {
                    warn!("genre request failed: {source}");
                } else {
                    warn!("genre advisor: {e}");
                }
                e.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    struct MockClient {
        reply: Value,
        seen: Mutex<Vec<(String, ChatCompletionRequest)>>,
    }

    impl MockClient {
        fn replying(reply: Value) -> Self {
            Self {
                reply,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CompletionClient for MockClient {
        async fn complete(
            &self,
            api_key: &str,
            request: &ChatCompletionRequest,
        ) -> Result<Value, AdvisorError> {
            self.seen
                .lock()
                .unwrap()
                .push((api_key.to_string(), request.clone()));
            Ok(self.reply.clone())
        }
    }

    fn long_excerpt() -> String {
        "The fog rolled over the harbour while the lighthouse keeper counted ships. ".repeat(20)
    }

    #[tokio::test]
    async fn test_short_excerpt_rejected_before_request() {
        let mock = MockClient::replying(json!({}));
        let advisor = GenreAdvisor::new(mock, AdvisorConfig::default(), Some("key".into()));
        let err = advisor.request("too short").await.unwrap_err();
        assert!(matches!(err, AdvisorError::ExcerptTooShort { len: 9 }));
        assert!(advisor.client().seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_key_short_circuits() {
        let mock = MockClient::replying(json!({}));
        let advisor = GenreAdvisor::new(mock, AdvisorConfig::default(), None);
        assert_eq!(advisor.advise(&long_excerpt()).await, NO_API_KEY_MESSAGE);
        assert!(advisor.client().seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_answer_and_request_shape() {
        let mock = MockClient::replying(json!({
            "choices": [{"message": {"role": "assistant", "content": "Gothic mystery."}}]
        }));
        let advisor = GenreAdvisor::new(mock, AdvisorConfig::default(), Some("secret".into()));
        let text = long_excerpt();
        assert_eq!(advisor.advise(&text).await, "Gothic mystery.");

        let seen = advisor.client().seen.lock().unwrap();
        let (key, request) = &seen[0];
        assert_eq!(key, "secret");
        assert_eq!(request.model, "gpt-3.5-turbo");
        assert_eq!(request.temperature, 0.7);
        assert_eq!(request.max_tokens, 400);
        assert_eq!(request.messages[0].content, SYSTEM_PROMPT);
        let prompt = &request.messages[1].content;
        assert!(prompt.contains(&truncate_excerpt(&text)));
        assert!(!prompt.contains(&text));
    }

    #[tokio::test]
    async fn test_unexpected_response_is_reported() {
        let mock = MockClient::replying(json!({"error": {"message": "quota"}}));
        let advisor = GenreAdvisor::new(mock, AdvisorConfig::default(), Some("k".into()));
        let answer = advisor.advise(&long_excerpt()).await;
        assert!(answer.starts_with("Unexpected response:\n"));
        assert!(answer.contains("quota"));
    }

    /// Serves one canned HTTP response on a local port and returns the endpoint URL.
    fn serve_once(status_line: &'static str, body: &'static str) -> String {
        use std::io::{BufRead, BufReader, Read, Write};
        use std::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);
            let mut content_length = 0usize;
            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).unwrap() == 0 || line == "\r\n" {
                    break;
                }
                if let Some((name, value)) = line.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().unwrap();
                    }
                }
            }
            let mut request_body = vec![0u8; content_length];
            reader.read_exact(&mut request_body).unwrap();

            let mut stream = reader.into_inner();
            let response = format!(
                "{status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).unwrap();
        });
        format!("http://{addr}/v1/chat/completions")
    }

    #[tokio::test]
    async fn test_http_error_status_reports_json_body() {
        let endpoint = serve_once(
            "HTTP/1.1 401 Unauthorized",
            r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error"}}"#,
        );
        let advisor = GenreAdvisor::new(
            HttpCompletionClient::new(endpoint),
            AdvisorConfig::default(),
            Some("k".into()),
        );
        let answer = advisor.advise(&long_excerpt()).await;
        assert!(answer.starts_with("Unexpected response:"), "{answer}");
        assert!(answer.contains("Incorrect API key provided"));
    }

    #[tokio::test]
    async fn test_http_success_returns_content() {
        let endpoint = serve_once(
            "HTTP/1.1 200 OK",
            r#"{"choices":[{"message":{"role":"assistant","content":"Maritime gothic."}}]}"#,
        );
        let advisor = GenreAdvisor::new(
            HttpCompletionClient::new(endpoint),
            AdvisorConfig::default(),
            Some("k".into()),
        );
        assert_eq!(advisor.advise(&long_excerpt()).await, "Maritime gothic.");
    }

    #[test]
    fn test_truncate_counts_chars() {
        let text = "é".repeat(1500);
        let excerpt = truncate_excerpt(&text);
        assert_eq!(excerpt.chars().count(), MAX_EXCERPT_CHARS);
    }
}
