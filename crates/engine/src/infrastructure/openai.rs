//! Client for OpenAI-compatible chat-completion APIs (ModelScope by default).
//!
//! One attempt per call, no retry. Streaming requests read the server-sent
//! `data:` chunks incrementally and stop at `[DONE]`.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream;
use futures_util::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::infrastructure::config::{ConfigError, LlmConfig};
use crate::infrastructure::ports::{
    FinishReason, LlmError, LlmPort, LlmRequest, LlmResponse, LlmStream, MessageRole, TokenUsage,
};

#[derive(Clone)]
pub struct OpenAiCompatClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiCompatClient {
    /// Fails rather than falling back to a client without the configured timeout.
    pub fn new(config: &LlmConfig) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    async fn send(&self, request: &LlmRequest, stream: bool) -> Result<reqwest::Response, LlmError> {
        let api_request = OpenAIChatRequest {
            model: self.model.clone(),
            messages: build_messages(request),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream,
        };

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&api_request)
            .send()
            .await
            .map_err(LlmError::request_failed)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.map_err(LlmError::request_failed)?;
            return Err(LlmError::RequestFailed(format!("HTTP {status}: {error_text}")));
        }

        Ok(response)
    }
}

#[async_trait]
impl LlmPort for OpenAiCompatClient {
    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        let response = self.send(&request, false).await?;

        let api_response: OpenAIChatResponse = response
            .json()
            .await
            .map_err(LlmError::invalid_response)?;

        convert_response(api_response)
    }

    async fn generate_stream(&self, request: LlmRequest) -> Result<LlmStream, LlmError> {
        let response = self.send(&request, true).await?;
        Ok(sse_deltas(response.bytes_stream().boxed()))
    }
}

fn build_messages(request: &LlmRequest) -> Vec<OpenAIMessage> {
    let mut messages = Vec::new();

    if let Some(system) = &request.system_prompt {
        messages.push(OpenAIMessage {
            role: "system".to_string(),
            content: Some(system.clone()),
        });
    }

    for msg in &request.messages {
        messages.push(OpenAIMessage {
            role: match msg.role {
                MessageRole::User => "user",
                MessageRole::Assistant => "assistant",
            }
            .to_string(),
            content: Some(msg.content.clone()),
        });
    }

    messages
}

fn convert_response(response: OpenAIChatResponse) -> Result<LlmResponse, LlmError> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::InvalidResponse("No choices in LLM response".to_string()))?;

    Ok(LlmResponse {
        content: choice.message.content.unwrap_or_default(),
        finish_reason: parse_finish_reason(choice.finish_reason.as_deref()),
        usage: response.usage.map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        }),
    })
}

fn parse_finish_reason(raw: Option<&str>) -> FinishReason {
    match raw {
        Some("stop") | None => FinishReason::Stop,
        Some("length") => FinishReason::Length,
        Some("content_filter") => FinishReason::ContentFilter,
        Some(_) => FinishReason::Unknown,
    }
}

// =============================================================================
// Server-sent event decoding
// =============================================================================

#[derive(Debug, PartialEq, Eq)]
enum SseEvent {
    Delta(String),
    Done,
}

/// Splits a byte stream into `data:` lines. Chunks may end mid-line or
/// mid-character, so bytes are buffered until a newline arrives.
#[derive(Default)]
struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    fn push(&mut self, bytes: &[u8]) -> Vec<Result<SseEvent, LlmError>> {
        self.buffer.extend_from_slice(bytes);
        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(event) = decode_line(&String::from_utf8_lossy(&line)) {
                events.push(event);
            }
        }
        events
    }

    /// Decode whatever is left once the body ends without a trailing newline.
    fn finish(&mut self) -> Option<Result<SseEvent, LlmError>> {
        let rest = std::mem::take(&mut self.buffer);
        decode_line(&String::from_utf8_lossy(&rest))
    }
}

fn decode_line(line: &str) -> Option<Result<SseEvent, LlmError>> {
    let data = line.trim().strip_prefix("data:")?.trim();
    if data.is_empty() {
        return None;
    }
    if data == "[DONE]" {
        return Some(Ok(SseEvent::Done));
    }

    match serde_json::from_str::<OpenAIStreamChunk>(data) {
        Ok(chunk) => chunk
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.delta.content)
            .filter(|text| !text.is_empty())
            .map(|text| Ok(SseEvent::Delta(text))),
        Err(e) => Some(Err(LlmError::invalid_response(format!(
            "Undecodable stream chunk: {e}"
        )))),
    }
}

struct SseState<B> {
    body: B,
    decoder: SseDecoder,
    pending: VecDeque<Result<String, LlmError>>,
    finished: bool,
}

fn sse_deltas<B, T, E>(body: B) -> LlmStream
where
    B: futures_util::Stream<Item = Result<T, E>> + Send + Unpin + 'static,
    T: AsRef<[u8]> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    let state = SseState {
        body,
        decoder: SseDecoder::default(),
        pending: VecDeque::new(),
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.pending.pop_front() {
                return Some((item, state));
            }
            if state.finished {
                return None;
            }

            match state.body.next().await {
                Some(Ok(chunk)) => {
                    for event in state.decoder.push(chunk.as_ref()) {
                        match event {
                            Ok(SseEvent::Delta(text)) => state.pending.push_back(Ok(text)),
                            Ok(SseEvent::Done) => {
                                state.finished = true;
                                break;
                            }
                            Err(e) => state.pending.push_back(Err(e)),
                        }
                    }
                }
                Some(Err(e)) => {
                    state.finished = true;
                    state.pending.push_back(Err(LlmError::request_failed(e)));
                }
                None => {
                    state.finished = true;
                    match state.decoder.finish() {
                        Some(Ok(SseEvent::Delta(text))) => state.pending.push_back(Ok(text)),
                        Some(Err(e)) => state.pending.push_back(Err(e)),
                        Some(Ok(SseEvent::Done)) | None => {}
                    }
                }
            }
        }
    })
    .boxed()
}

// =============================================================================
// OpenAI API types
// =============================================================================

#[derive(Debug, Serialize)]
struct OpenAIChatRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChatResponse {
    choices: Vec<OpenAIChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize, Default)]
struct OpenAIChoice {
    message: OpenAIMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAIStreamChunk {
    #[serde(default)]
    choices: Vec<OpenAIStreamChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIStreamChoice {
    #[serde(default)]
    delta: OpenAIDelta,
}

#[derive(Debug, Default, Deserialize)]
struct OpenAIDelta {
    #[serde(default)]
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::ChatMessage;
    use std::convert::Infallible;

    fn chunk(text: &str) -> String {
        format!(
            "data: {}\n\n",
            serde_json::json!({"choices": [{"delta": {"content": text}}]})
        )
    }

    async fn collect(parts: Vec<String>) -> Vec<Result<String, LlmError>> {
        let body = stream::iter(
            parts
                .into_iter()
                .map(|p| Ok::<_, Infallible>(p.into_bytes())),
        );
        sse_deltas(body).collect().await
    }

    #[tokio::test]
    async fn deltas_arrive_in_order_and_stop_at_done() {
        let items = collect(vec![
            chunk("{\"question\":"),
            chunk(" \"你好\"}"),
            "data: [DONE]\n\n".to_string(),
            chunk("ignored"),
        ])
        .await;

        let texts: Vec<String> = items.into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(texts, vec!["{\"question\":", " \"你好\"}"]);
    }

    #[tokio::test]
    async fn lines_split_across_chunks_are_reassembled() {
        let whole = chunk("面试官");
        let bytes = whole.as_bytes();
        // Split inside the multi-byte text.
        let cut = whole.find("面").unwrap() + 1;
        let body = stream::iter(vec![
            Ok::<_, Infallible>(bytes[..cut].to_vec()),
            Ok(bytes[cut..].to_vec()),
        ]);
        let items: Vec<_> = sse_deltas(body).collect().await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].as_ref().unwrap(), "面试官");
    }

    #[tokio::test]
    async fn trailing_line_without_newline_is_flushed() {
        let mut last = chunk("end");
        last.truncate(last.trim_end().len());
        let items = collect(vec![last]).await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].as_ref().unwrap(), "end");
    }

    #[tokio::test]
    async fn garbage_chunk_is_an_invalid_response() {
        let items = collect(vec!["data: {not json\n".to_string()]).await;
        assert!(matches!(items[0], Err(LlmError::InvalidResponse(_))));
    }

    #[test]
    fn comments_and_role_only_chunks_are_skipped() {
        let mut decoder = SseDecoder::default();
        let events = decoder.push(
            b": keep-alive\n\ndata: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n",
        );
        assert!(events.is_empty());
    }

    #[test]
    fn build_messages_puts_system_first() {
        let request = LlmRequest::new(vec![
            ChatMessage::user("你好"),
            ChatMessage::assistant("嗯"),
        ])
        .with_system_prompt("你是张经理");
        let messages = build_messages(&request);
        let roles: Vec<&str> = messages.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, vec!["system", "user", "assistant"]);
        assert_eq!(messages[0].content.as_deref(), Some("你是张经理"));
    }

    #[test]
    fn convert_response_requires_a_choice() {
        let empty = OpenAIChatResponse {
            choices: vec![],
            usage: None,
        };
        assert!(matches!(
            convert_response(empty),
            Err(LlmError::InvalidResponse(_))
        ));

        let raw = r#"{"choices":[{"message":{"role":"assistant","content":"好"},"finish_reason":"length"}],
                      "usage":{"prompt_tokens":3,"completion_tokens":1,"total_tokens":4}}"#;
        let parsed: OpenAIChatResponse = serde_json::from_str(raw).unwrap();
        let response = convert_response(parsed).unwrap();
        assert_eq!(response.content, "好");
        assert_eq!(response.finish_reason, FinishReason::Length);
        assert_eq!(response.usage.map(|u| u.total_tokens), Some(4));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = OpenAiCompatClient::new(&LlmConfig {
            api_key: "k".to_string(),
            base_url: "https://example.test/v1/".to_string(),
            model: "m".to_string(),
            timeout_secs: 5,
        })
        .unwrap();
        assert_eq!(client.completions_url(), "https://example.test/v1/chat/completions");
        assert_eq!(client.model(), "m");
    }

    #[test]
    fn client_build_failure_is_a_config_error() {
        let err = ConfigError::HttpClient("TLS backend unavailable".to_string());
        assert_eq!(
            err.to_string(),
            "failed to build HTTP client: TLS backend unavailable"
        );
    }
}
