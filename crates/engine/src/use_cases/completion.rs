//! Single-shot completion calls shared by every use case.
//!
//! A missing client or an upstream failure both come back as `None`; the
//! caller then serves its local fallback.

use std::sync::Arc;

use crate::infrastructure::ports::{
    ChatMessage, FinishReason, LlmPort, LlmRequest, LlmResponse, LlmStream,
};
use crate::prompt_templates::PromptKind;

/// Build a request with the generation budget for `kind`.
pub fn build_request(kind: PromptKind, system_prompt: String, messages: Vec<ChatMessage>) -> LlmRequest {
    LlmRequest::new(messages)
        .with_system_prompt(system_prompt)
        .with_temperature(kind.temperature())
        .with_max_tokens(Some(kind.max_tokens()))
}

/// Run one completion and return its text.
pub async fn complete(
    llm: Option<&Arc<dyn LlmPort>>,
    kind: PromptKind,
    system_prompt: String,
    messages: Vec<ChatMessage>,
) -> Option<String> {
    let llm = llm?;
    let request = build_request(kind, system_prompt, messages);

    match llm.generate(request).await {
        Ok(response) => {
            log_completion(kind, &response);
            Some(response.content)
        }
        Err(e) => {
            tracing::warn!(kind = kind.as_str(), error = %e, "Completion failed, using fallback");
            None
        }
    }
}

/// A reply cut off at the token limit is still returned; the normalizer may
/// salvage a complete JSON value from it.
fn log_completion(kind: PromptKind, response: &LlmResponse) {
    let usage = response.usage.as_ref();
    tracing::debug!(
        kind = kind.as_str(),
        chars = response.content.chars().count(),
        prompt_tokens = usage.map(|u| u.prompt_tokens),
        completion_tokens = usage.map(|u| u.completion_tokens),
        total_tokens = usage.map(|u| u.total_tokens),
        "Completion received"
    );

    match response.finish_reason {
        FinishReason::Stop => {}
        FinishReason::Length => tracing::warn!(
            kind = kind.as_str(),
            max_tokens = kind.max_tokens(),
            "Completion hit the token limit, reply may be truncated"
        ),
        FinishReason::ContentFilter | FinishReason::Unknown => tracing::warn!(
            kind = kind.as_str(),
            finish_reason = ?response.finish_reason,
            "Completion ended early"
        ),
    }
}

/// Open a streaming completion.
pub async fn complete_stream(
    llm: Option<&Arc<dyn LlmPort>>,
    kind: PromptKind,
    system_prompt: String,
    messages: Vec<ChatMessage>,
) -> Option<LlmStream> {
    let llm = llm?;
    let request = build_request(kind, system_prompt, messages);

    match llm.generate_stream(request).await {
        Ok(stream) => Some(stream),
        Err(e) => {
            tracing::warn!(kind = kind.as_str(), error = %e, "Stream failed to open, using fallback");
            None
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use futures_util::stream::{self, StreamExt};

    use crate::infrastructure::ports::{LlmError, LlmResponse};

    use super::*;

    /// Replies with a fixed script and records every request it sees.
    pub struct ScriptedLlm {
        reply: Result<String, LlmError>,
        pub requests: Mutex<Vec<LlmRequest>>,
    }

    impl ScriptedLlm {
        pub fn replying(reply: impl Into<String>) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.into()),
                requests: Mutex::new(Vec::new()),
            })
        }

        pub fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: Err(LlmError::request_failed("HTTP 503: upstream down")),
                requests: Mutex::new(Vec::new()),
            })
        }

        pub fn last_request(&self) -> LlmRequest {
            self.requests
                .lock()
                .unwrap()
                .last()
                .cloned()
                .expect("a request was sent")
        }

        fn record(&self, request: LlmRequest) {
            self.requests.lock().unwrap().push(request);
        }
    }

    #[async_trait]
    impl LlmPort for ScriptedLlm {
        async fn generate(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
            self.record(request);
            self.reply.clone().map(LlmResponse::text)
        }

        /// Streams the script back a few characters at a time.
        async fn generate_stream(&self, request: LlmRequest) -> Result<LlmStream, LlmError> {
            self.record(request);
            let reply = self.reply.clone()?;
            let chars: Vec<char> = reply.chars().collect();
            let chunks: Vec<Result<String, LlmError>> = chars
                .chunks(8)
                .map(|chunk| Ok(chunk.iter().collect()))
                .collect();
            Ok(stream::iter(chunks).boxed())
        }
    }
}
