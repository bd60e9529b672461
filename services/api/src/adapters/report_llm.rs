//! services/api/src/adapters/report_llm.rs
//!
//! This module contains the adapter for the report-writing LLM.
//! It implements the `ReportGenerationService` port from the `core` crate by
//! streaming a chat completion from an OpenAI-compatible backend (DeepSeek).

const SYSTEM_INSTRUCTIONS: &str = r#"You are the analysis engine behind the "2026 Life Script" personality quiz. Your readers are 18 to 35 years old.

Output plain text only. No markdown, no symbols for formatting, no questions back to the reader.

Voice:
- The report body (the long analysis, suggestions, tips and warnings) speaks to the reader in the second person: "you", "your".
- The three share captions speak as the reader in the first person: "I", "my". The reader posts them as their own words.

Style: talk like a sharp friend of the same age. Casual, a little meme-literate, no motivational clichés, straight to the point."#;

const USER_PROMPT_TEMPLATE: &str = r#"Quiz answers: {answers}

Basic quiz result:
- Money type: {money_type}
- Life type: {life_type}
- Personality type: {personality_type}
- Summary: {summary}

Using these choices, write an in-depth, sharp and detailed "2026 Life Script" report.

Emit the sections strictly in this order, each opened by its marker:

[CONTENT_START]
(About 1000 words of analysis across four angles: subconscious drives, spending decisions, boundaries in relationships, and the likely path of the next ten years.)

[SUGGESTIONS]
suggestion 1|suggestion 2|suggestion 3
(Three concrete money-making suggestions, separated by "|".)

[TIPS]
tip 1|tip 2|tip 3
(Three concrete work-life balance tips tied to the lifestyle answers, separated by "|".)

[WARNINGS]
warning 1|warning 2
(Two personal risk warnings tied to the personality traits, separated by "|".)

[COPY_MEME]
(A self-mocking, meme-style caption in the first person that makes friends want to take the quiz.)

[COPY_LITERARY]
(A reflective, literary caption in the first person.)

[COPY_SIMPLE]
(A short, crisp caption in the first person.)"#;

const UNKNOWN_LABEL: &str = "unknown";

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs, CreateChatCompletionStreamResponse,
    },
    Client,
};
use async_stream::stream;
use async_trait::async_trait;
use futures::StreamExt;
use life_script_core::{
    domain::{Answers, BasicResults},
    ports::{PortError, PortResult, ReportGenerationService, ReportRequest, ReportStream},
};
use tracing::{debug, error, warn};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `ReportGenerationService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiReportAdapter {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
}

impl OpenAiReportAdapter {
    /// Creates a new `OpenAiReportAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String, temperature: f32) -> Self {
        Self {
            client,
            model,
            temperature,
        }
    }
}

/// `Q1: A, Q2: C, ...` in question order.
fn format_answers(answers: &Answers) -> String {
    answers
        .iter()
        .map(|(question, choice)| format!("Q{}: {:?}", question, choice))
        .collect::<Vec<_>>()
        .join(", ")
}

fn label_or_unknown(label: &str) -> &str {
    if label.trim().is_empty() {
        UNKNOWN_LABEL
    } else {
        label
    }
}

fn build_user_prompt(answers: &Answers, basic: &BasicResults) -> String {
    USER_PROMPT_TEMPLATE
        .replace("{answers}", &format_answers(answers))
        .replace("{money_type}", label_or_unknown(&basic.money_type))
        .replace("{life_type}", label_or_unknown(&basic.life_type))
        .replace("{personality_type}", label_or_unknown(&basic.personality_type))
        .replace("{summary}", label_or_unknown(&basic.summary))
}

/// The text carried by one streamed chunk, if any.
fn chunk_content(chunk: CreateChatCompletionStreamResponse) -> Option<String> {
    let content: String = chunk
        .choices
        .into_iter()
        .filter_map(|choice| choice.delta.content)
        .collect();
    (!content.is_empty()).then_some(content)
}

/// Maps one raw stream item. Frames that fail to decode are dropped; any
/// other error ends the stream.
fn map_item(
    item: Result<CreateChatCompletionStreamResponse, OpenAIError>,
) -> Option<PortResult<String>> {
    match item {
        Ok(chunk) => chunk_content(chunk).map(Ok),
        Err(OpenAIError::JSONDeserialize(..)) => {
            warn!("Skipping an undecodable frame from the report stream.");
            None
        }
        Err(e) => {
            error!("Report stream failed: {}", e);
            Some(Err(PortError::Upstream(e.to_string())))
        }
    }
}

//=========================================================================================
// `ReportGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl ReportGenerationService for OpenAiReportAdapter {
    async fn stream_report(&self, request: &ReportRequest) -> PortResult<ReportStream> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_INSTRUCTIONS)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(build_user_prompt(&request.answers, &request.basic))
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .stream(true)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let mut upstream = self
            .client
            .chat()
            .create_stream(chat_request)
            .await
            .map_err(|e: OpenAIError| {
                error!("Report request was rejected: {}", e);
                PortError::Upstream(e.to_string())
            })?;

        // The first item decides whether the backend accepted the request, so
        // a refusal surfaces as an error before the caller commits to streaming.
        let mut first = None;
        while let Some(item) = upstream.next().await {
            match item {
                Err(OpenAIError::JSONDeserialize(..)) => {
                    warn!("Skipping an undecodable frame from the report stream.");
                }
                Err(e) => {
                    error!("Report request failed before any content: {}", e);
                    return Err(PortError::Upstream(e.to_string()));
                }
                Ok(chunk) => {
                    first = chunk_content(chunk);
                    break;
                }
            }
        }
        debug!("Report stream opened.");

        let fragments = stream! {
            if let Some(content) = first {
                yield Ok(content);
            }
            while let Some(item) = upstream.next().await {
                match map_item(item) {
                    Some(Err(e)) => {
                        yield Err(e);
                        break;
                    }
                    Some(Ok(content)) => yield Ok(content),
                    None => {}
                }
            }
        };

        Ok(Box::pin(fragments))
    }
}
