use anyhow::{Context, Result};
use futures_util::{Stream, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::borrow::Cow;
use std::pin::Pin;

use super::prompt::{SYSTEM_PROMPT_TEMPLATE, build_system_prompt};
use crate::lines::LineBuffer;

/// One message to translate between two languages.
#[derive(Debug, Clone)]
pub struct TranslationRequest {
    pub source_text: String,
    pub source_language: String,
    pub target_language: String,
    pub model: String,
    pub endpoint: String,
}

impl TranslationRequest {
    /// Compute cache key for this request
    pub fn cache_key(&self) -> String {
        let cache_input = serde_json::json!({
            "source_text": self.source_text,
            "source_language": self.source_language,
            "target_language": self.target_language,
            "model": self.model,
            "endpoint": self.endpoint,
            "prompt_hash": Self::prompt_hash(),
        });

        let mut hasher = Sha256::new();
        hasher.update(cache_input.to_string().as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Compute hash of the system prompt template
    pub fn prompt_hash() -> String {
        let mut hasher = Sha256::new();
        hasher.update(SYSTEM_PROMPT_TEMPLATE.as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: Cow<'a, str>,
}

#[derive(Debug, Deserialize)]
struct StreamResponse {
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: Delta,
}

#[derive(Debug, Deserialize)]
struct Delta {
    content: Option<String>,
}

pub type TextStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Client for an OpenAI-compatible `/v1/chat/completions` endpoint.
#[derive(Debug, Clone)]
pub struct TranslationClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl TranslationClient {
    pub fn new(endpoint: String, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            api_key,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Streams the translation chunk by chunk as the endpoint produces it.
    pub async fn translate_stream(&self, request: &TranslationRequest) -> Result<TextStream> {
        let url = format!(
            "{}/v1/chat/completions",
            self.endpoint.trim_end_matches('/')
        );

        let system_prompt = build_system_prompt(&request.source_language, &request.target_language);

        let chat_request = ChatCompletionRequest {
            model: &request.model,
            messages: vec![
                Message {
                    role: "system",
                    content: Cow::Owned(system_prompt),
                },
                Message {
                    role: "user",
                    content: Cow::Borrowed(&request.source_text),
                },
            ],
            stream: true,
        };

        let mut http_request = self.client.post(&url).json(&chat_request);

        if let Some(api_key) = &self.api_key {
            http_request = http_request.header("Authorization", format!("Bearer {api_key}"));
        }

        let response = http_request
            .send()
            .await
            .with_context(|| format!("Failed to connect to API endpoint: {url}"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("API request failed with status {status}: {body}");
        }

        Ok(Box::pin(sse_to_text_stream(response.bytes_stream())))
    }

    /// Translates the whole message and returns the trimmed result.
    pub async fn translate(&self, request: &TranslationRequest) -> Result<String> {
        let mut stream = self.translate_stream(request).await?;
        let mut translated = String::new();

        while let Some(chunk) = stream.next().await {
            translated.push_str(&chunk?);
        }

        let translated = translated.trim();
        if translated.is_empty() {
            anyhow::bail!("Translation endpoint returned an empty response");
        }
        Ok(translated.to_string())
    }
}

/// Converts a raw SSE byte stream into a stream of text chunks.
fn sse_to_text_stream<B, E>(
    byte_stream: impl Stream<Item = Result<B, E>> + Send + 'static,
) -> impl Stream<Item = Result<String>> + Send
where
    B: AsRef<[u8]> + Send,
    E: std::fmt::Display + Send,
{
    async_stream::stream! {
        let mut byte_stream = std::pin::pin!(byte_stream);
        let mut lines = LineBuffer::new();

        while let Some(chunk_result) = byte_stream.next().await {
            let chunk = match chunk_result {
                Ok(c) => c,
                Err(e) => {
                    yield Err(anyhow::anyhow!("Stream error: {e}"));
                    return;
                }
            };

            lines.extend(chunk.as_ref());

            while let Some(line) = lines.next_line() {
                let line = String::from_utf8_lossy(&line);
                let line = line.trim();

                if line == "data: [DONE]" {
                    return;
                }
                if let Some(content) = parse_sse_line(line) {
                    yield Ok(content);
                }
            }
        }
    }
}

/// Extracts the delta text from one `data:` line, if it carries any.
fn parse_sse_line(line: &str) -> Option<String> {
    let json_str = line.strip_prefix("data: ")?;

    let response = serde_json::from_str::<StreamResponse>(json_str).ok()?;

    let content: String = response
        .choices
        .into_iter()
        .filter_map(|c| c.delta.content)
        .filter(|c| !c.is_empty())
        .collect();

    if content.is_empty() {
        None
    } else {
        Some(content)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use futures_util::stream;

    fn request(text: &str, source: &str, target: &str) -> TranslationRequest {
        TranslationRequest {
            source_text: text.to_string(),
            source_language: source.to_string(),
            target_language: target.to_string(),
            model: "gemma3:12b".to_string(),
            endpoint: "http://localhost:11434".to_string(),
        }
    }

    #[test]
    fn test_cache_key_depends_on_direction() {
        let en_ka = request("hello", "en", "ka");
        let ru_ka = request("hello", "ru", "ka");
        assert_ne!(en_ka.cache_key(), ru_ka.cache_key());
        assert_eq!(en_ka.cache_key(), request("hello", "en", "ka").cache_key());
    }

    #[test]
    fn test_parse_sse_line_with_content() {
        let line = r#"data: {"choices":[{"delta":{"content":"Hello"}}]}"#;
        assert_eq!(parse_sse_line(line), Some("Hello".to_string()));
    }

    #[test]
    fn test_parse_sse_line_without_content() {
        assert_eq!(
            parse_sse_line(r#"data: {"choices":[{"delta":{}}]}"#),
            None
        );
        assert_eq!(
            parse_sse_line(r#"data: {"choices":[{"delta":{"content":""}}]}"#),
            None
        );
        assert_eq!(parse_sse_line(": keep-alive"), None);
        assert_eq!(parse_sse_line("data: not json"), None);
    }

    #[tokio::test]
    async fn test_sse_stream_reassembles_split_chunks() {
        let body = "data: {\"choices\":[{\"delta\":{\"content\":\"გამარ\"}}]}\n\n\
                    data: {\"choices\":[{\"delta\":{\"content\":\"ჯობა\"}}]}\n\n\
                    data: [DONE]\n\n\
                    data: {\"choices\":[{\"delta\":{\"content\":\"ignored\"}}]}\n";
        let bytes = body.as_bytes();
        // Split inside a multi-byte character
        let chunks: Vec<Result<Vec<u8>, std::io::Error>> = vec![
            Ok(bytes[..40].to_vec()),
            Ok(bytes[40..].to_vec()),
        ];

        let text: Vec<String> = sse_to_text_stream(stream::iter(chunks))
            .map(|item| item.unwrap())
            .collect()
            .await;
        assert_eq!(text.concat(), "გამარჯობა");
    }

    #[tokio::test]
    async fn test_sse_stream_error_ends_stream() {
        let chunks: Vec<Result<Vec<u8>, std::io::Error>> = vec![Err(std::io::Error::other("reset"))];

        let items: Vec<Result<String>> = sse_to_text_stream(stream::iter(chunks)).collect().await;
        assert_eq!(items.len(), 1);
        assert!(items[0].as_ref().unwrap_err().to_string().contains("reset"));
    }
}
