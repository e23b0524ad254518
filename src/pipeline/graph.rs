//! Pipeline execution
//!
//! Runs the fixed task graph for one upload: transcribe, extract, fan out one
//! answer task per question, join, combine, render. Fan-out uses a
//! `tokio::task::JoinSet` so the join barrier is guaranteed: the combine stage
//! cannot start until every spawned branch has been drained from the set.

use crate::error::AppError;
use crate::model::LanguageModel;
use crate::pipeline::stages::combine_results;
use crate::pipeline::types::{QaPair, RunStage};
use crate::render::DocumentRenderer;
use anyhow::anyhow;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info};

/// Execute one pipeline run over a base64-encoded question-paper image.
///
/// Stages 1-2 are strictly sequential; answer generation runs one concurrent
/// branch per question, each owning its question and a handle to the model.
/// Gathered pairs keep branch completion order, so the final document may
/// number questions differently from the source paper.
///
/// No retries and no partial output: any error in any stage aborts the whole
/// run, after every in-flight branch has been joined.
pub async fn run(
    model: Arc<dyn LanguageModel>,
    renderer: Arc<dyn DocumentRenderer>,
    image_base64: String,
) -> Result<Vec<u8>, AppError> {
    info!(stage = %RunStage::Transcribing, image_len = image_base64.len(), "Pipeline run started");
    let transcript = model.transcribe(&image_base64).await?;
    debug!(transcript_len = transcript.len(), "Transcription complete");

    info!(stage = %RunStage::Extracting, "Extracting questions");
    let questions = model.extract_questions(&transcript).await?;
    let question_count = questions.len();
    info!(question_count, "Questions extracted");

    info!(stage = %RunStage::Answering, branches = question_count, "Fanning out answer tasks");
    let mut branches = JoinSet::new();
    for question in questions {
        let model = Arc::clone(&model);
        branches.spawn(async move { model.generate_answer(&question).await });
    }

    // Join barrier: drain every branch before deciding the run's fate.
    let mut pairs: Vec<QaPair> = Vec::with_capacity(question_count);
    let mut first_error: Option<AppError> = None;
    while let Some(joined) = branches.join_next().await {
        match joined {
            Ok(Ok(pair)) => pairs.push(pair),
            Ok(Err(e)) => {
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
            Err(e) => {
                if first_error.is_none() {
                    first_error = Some(AppError::Internal(anyhow!("answer task panicked: {}", e)));
                }
            }
        }
    }
    if let Some(error) = first_error {
        return Err(error);
    }
    debug_assert_eq!(pairs.len(), question_count);

    info!(stage = %RunStage::Combining, pairs = pairs.len(), "Combining results");
    let notes = combine_results(&pairs);

    info!(stage = %RunStage::Rendering, markdown_len = notes.len(), "Rendering PDF");
    let pdf = renderer.render(&notes)?;
    info!(pdf_len = pdf.len(), "Pipeline run complete");
    Ok(pdf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::types::Question;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Scripted model: fixed extraction output, per-call counters.
    struct ScriptedModel {
        extraction: Result<Vec<Question>, String>,
        fail_answer_for: Option<String>,
        transcribe_calls: AtomicUsize,
        extract_calls: AtomicUsize,
        answer_calls: AtomicUsize,
    }

    impl ScriptedModel {
        fn with_questions(questions: Vec<Question>) -> Self {
            Self {
                extraction: Ok(questions),
                fail_answer_for: None,
                transcribe_calls: AtomicUsize::new(0),
                extract_calls: AtomicUsize::new(0),
                answer_calls: AtomicUsize::new(0),
            }
        }

        fn with_schema_error() -> Self {
            Self {
                extraction: Err("question list: expected value".to_string()),
                fail_answer_for: None,
                transcribe_calls: AtomicUsize::new(0),
                extract_calls: AtomicUsize::new(0),
                answer_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl LanguageModel for ScriptedModel {
        async fn transcribe(&self, _image_base64: &str) -> Result<String, AppError> {
            self.transcribe_calls.fetch_add(1, Ordering::SeqCst);
            Ok("# Mock Paper".to_string())
        }

        async fn extract_questions(&self, _markdown: &str) -> Result<Vec<Question>, AppError> {
            self.extract_calls.fetch_add(1, Ordering::SeqCst);
            match &self.extraction {
                Ok(questions) => Ok(questions.clone()),
                Err(message) => Err(AppError::SchemaValidation(message.clone())),
            }
        }

        async fn generate_answer(&self, question: &Question) -> Result<QaPair, AppError> {
            self.answer_calls.fetch_add(1, Ordering::SeqCst);
            // Jitter so branch completion order is not spawn order.
            let delay = (question.marks as u64 % 7) + 1;
            tokio::time::sleep(Duration::from_millis(delay)).await;
            if self.fail_answer_for.as_deref() == Some(question.question.as_str()) {
                return Err(AppError::ModelInvocation("provider timeout".to_string()));
            }
            Ok(QaPair {
                question: question.question.clone(),
                answer: format!("answer worth {} marks", question.marks),
            })
        }
    }

    /// Renderer that records the markdown it was asked to render.
    struct RecordingRenderer {
        last_markdown: Mutex<Option<String>>,
        fail: bool,
    }

    impl RecordingRenderer {
        fn new() -> Self {
            Self {
                last_markdown: Mutex::new(None),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                last_markdown: Mutex::new(None),
                fail: true,
            }
        }
    }

    impl DocumentRenderer for RecordingRenderer {
        fn render(&self, markdown: &str) -> Result<Vec<u8>, AppError> {
            *self.last_markdown.lock().unwrap() = Some(markdown.to_string());
            if self.fail {
                return Err(AppError::Render("renderer crashed".to_string()));
            }
            Ok(b"%PDF-stub".to_vec())
        }
    }

    fn question(text: &str, marks: f64) -> Question {
        Question {
            question: text.to_string(),
            marks,
        }
    }

    #[tokio::test]
    async fn test_two_question_paper_produces_two_blocks() {
        let model = Arc::new(ScriptedModel::with_questions(vec![
            question("Define entropy.", 2.0),
            question("Explain the second law.", 8.0),
        ]));
        let renderer = Arc::new(RecordingRenderer::new());

        let pdf = run(model.clone(), renderer.clone(), "aW1hZ2U=".to_string())
            .await
            .unwrap();

        assert_eq!(pdf, b"%PDF-stub");
        assert_eq!(model.transcribe_calls.load(Ordering::SeqCst), 1);
        assert_eq!(model.extract_calls.load(Ordering::SeqCst), 1);
        assert_eq!(model.answer_calls.load(Ordering::SeqCst), 2);

        let markdown = renderer.last_markdown.lock().unwrap().clone().unwrap();
        assert_eq!(markdown.matches("**Question ").count(), 2);
        assert_eq!(markdown.matches("**Answer:**").count(), 2);
    }

    #[tokio::test]
    async fn test_cardinality_preserved_across_fan_out() {
        let questions: Vec<Question> = (0..8)
            .map(|i| question(&format!("Question number {i}"), (i % 5) as f64 + 1.0))
            .collect();
        let model = Arc::new(ScriptedModel::with_questions(questions));
        let renderer = Arc::new(RecordingRenderer::new());

        run(model.clone(), renderer.clone(), "aW1hZ2U=".to_string())
            .await
            .unwrap();

        // The combine stage only ever sees the full gathered set.
        let markdown = renderer.last_markdown.lock().unwrap().clone().unwrap();
        assert_eq!(markdown.matches("**Question ").count(), 8);
        assert_eq!(model.answer_calls.load(Ordering::SeqCst), 8);
    }

    #[tokio::test]
    async fn test_zero_questions_renders_empty_document() {
        let model = Arc::new(ScriptedModel::with_questions(vec![]));
        let renderer = Arc::new(RecordingRenderer::new());

        let pdf = run(model.clone(), renderer.clone(), "aW1hZ2U=".to_string())
            .await
            .unwrap();

        assert_eq!(pdf, b"%PDF-stub");
        assert_eq!(model.answer_calls.load(Ordering::SeqCst), 0);
        let markdown = renderer.last_markdown.lock().unwrap().clone().unwrap();
        assert_eq!(markdown, "");
    }

    #[tokio::test]
    async fn test_malformed_extraction_fails_run_without_answer_calls() {
        let model = Arc::new(ScriptedModel::with_schema_error());
        let renderer = Arc::new(RecordingRenderer::new());

        let error = run(model.clone(), renderer.clone(), "aW1hZ2U=".to_string())
            .await
            .unwrap_err();

        assert_eq!(error.kind(), "schema_validation");
        assert_eq!(model.answer_calls.load(Ordering::SeqCst), 0);
        // No partial document reaches the renderer.
        assert!(renderer.last_markdown.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failed_branch_fails_whole_run_after_join() {
        let mut model = ScriptedModel::with_questions(vec![
            question("Define entropy.", 2.0),
            question("Explain the second law.", 8.0),
            question("State the third law.", 4.0),
        ]);
        model.fail_answer_for = Some("Explain the second law.".to_string());
        let model = Arc::new(model);
        let renderer = Arc::new(RecordingRenderer::new());

        let error = run(model.clone(), renderer.clone(), "aW1hZ2U=".to_string())
            .await
            .unwrap_err();

        assert_eq!(error.kind(), "model_invocation");
        // The join barrier still waited for every branch.
        assert_eq!(model.answer_calls.load(Ordering::SeqCst), 3);
        assert!(renderer.last_markdown.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_renderer_failure_fails_run() {
        let model = Arc::new(ScriptedModel::with_questions(vec![question(
            "Define entropy.",
            2.0,
        )]));
        let renderer = Arc::new(RecordingRenderer::failing());

        let error = run(model, renderer, "aW1hZ2U=".to_string())
            .await
            .unwrap_err();
        assert_eq!(error.kind(), "render");
    }
}
