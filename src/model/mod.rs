//! Language model capability adapter
//!
//! The only point of contact with the external model. Exposes the three
//! pipeline operations as a typed trait; structured responses are decoded
//! at this boundary or the run fails with a schema validation error.

pub mod client;
pub mod types;

use crate::error::AppError;
use crate::pipeline::types::{QaPair, Question};
use async_trait::async_trait;
use serde::Deserialize;

use client::ChatClient;
use types::{ChatMessage, ContentPart, ImageUrl};

/// System prompt for the transcription stage
const TRANSCRIBE_SYSTEM_PROMPT: &str =
    "You are an expert in converting question papers to markdown format.";

/// User prompt for the transcription stage
const TRANSCRIBE_USER_PROMPT: &str = "Convert the following question paper to markdown format. \
     Focus more on extracting questions and answers not irrelevant text.";

/// System prompt for the question extraction stage
const EXTRACT_SYSTEM_PROMPT: &str =
    "You are an expert in extracting questions based on a given question paper.";

/// System prompt for the answer generation stage
const ANSWER_SYSTEM_PROMPT: &str =
    "You are an expert in generating question-answer pairs based on the given question.";

/// Typed interface over the external language model
///
/// Implementations make one outbound request per call. No caching, no
/// retries, no rate limiting; failures are terminal for the run.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Transcribe a base64-encoded question-paper image to markdown
    async fn transcribe(&self, image_base64: &str) -> Result<String, AppError>;

    /// Extract the ordered question list from a transcript
    async fn extract_questions(&self, markdown: &str) -> Result<Vec<Question>, AppError>;

    /// Generate an answer for one question, scaled to its marks
    async fn generate_answer(&self, question: &Question) -> Result<QaPair, AppError>;
}

/// JSON-mode envelope for the extraction response
#[derive(Deserialize)]
struct QuestionList {
    questions: Vec<Question>,
}

/// Decode a question list from a JSON-mode model reply, or fail validation
fn decode_questions(raw: &str) -> Result<Vec<Question>, AppError> {
    let list: QuestionList = serde_json::from_str(raw)
        .map_err(|e| AppError::SchemaValidation(format!("question list: {}", e)))?;
    Ok(list.questions)
}

/// Decode a question/answer pair from a JSON-mode model reply, or fail validation
fn decode_qa_pair(raw: &str) -> Result<QaPair, AppError> {
    serde_json::from_str(raw)
        .map_err(|e| AppError::SchemaValidation(format!("question-answer pair: {}", e)))
}

/// `LanguageModel` backed by an OpenAI-compatible chat completions API
pub struct OpenAiModel {
    client: ChatClient,
}

impl OpenAiModel {
    /// Create a new adapter over the given client
    pub fn new(client: ChatClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LanguageModel for OpenAiModel {
    async fn transcribe(&self, image_base64: &str) -> Result<String, AppError> {
        let messages = vec![
            ChatMessage::system(TRANSCRIBE_SYSTEM_PROMPT),
            ChatMessage::user_parts(vec![
                ContentPart::Text {
                    text: TRANSCRIBE_USER_PROMPT.to_string(),
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: format!("data:image/png;base64,{}", image_base64),
                    },
                },
            ]),
        ];
        self.client.complete(messages).await
    }

    async fn extract_questions(&self, markdown: &str) -> Result<Vec<Question>, AppError> {
        let messages = vec![
            ChatMessage::system(EXTRACT_SYSTEM_PROMPT),
            ChatMessage::user(format!(
                "Extract questions based on the following question paper: {}\n\n\
                 Reply with a JSON object of the form \
                 {{\"questions\": [{{\"question\": \"...\", \"marks\": 2}}]}} \
                 listing every question with its marks.",
                markdown
            )),
        ];
        let raw = self.client.complete_json(messages).await?;
        decode_questions(&raw)
    }

    async fn generate_answer(&self, question: &Question) -> Result<QaPair, AppError> {
        let messages = vec![
            ChatMessage::system(ANSWER_SYSTEM_PROMPT),
            ChatMessage::user(format!(
                "Generate a question-answer pair for the given question: {}.\n\
                 Also consider the marks for judging the length of the answer. {} marks.\n\
                 If the question is of higher marks, provide a more detailed answer.\n\
                 If the question is of lower marks, provide an answer in around 100 words.\n\
                 Reply with a JSON object of the form \
                 {{\"question\": \"...\", \"answer\": \"...\"}}.",
                question.question, question.marks
            )),
        ];
        let raw = self.client.complete_json(messages).await?;
        decode_qa_pair(&raw)
    }
}
