//! Pipeline domain types
//!
//! Typed shapes for the data flowing through the pipeline. `Question` and
//! `QaPair` are decoded strictly from model output at the capability boundary;
//! downstream stages never see untyped data.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single question extracted from the question paper
///
/// Immutable once created. `marks` drives the answer-length policy in the
/// answer-generation prompt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Question {
    /// The question text
    pub question: String,
    /// Marks allocated to the question
    pub marks: f64,
}

/// A question together with its generated answer
///
/// One is produced per fan-out branch; the gathered collection is ordered by
/// branch completion, not by the question's position in the source paper.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QaPair {
    /// The question text
    pub question: String,
    /// The generated answer
    pub answer: String,
}

/// Stage of a single pipeline run, used for stage-tagged logging
///
/// One run moves strictly through these stages in order; any error in any
/// stage aborts the run and the partial state is discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    /// Transcribing the uploaded image to markdown
    Transcribing,
    /// Extracting the question list from the transcript
    Extracting,
    /// Generating answers, one concurrent branch per question
    Answering,
    /// Combining gathered answers into the final markdown document
    Combining,
    /// Rendering the markdown document to PDF bytes
    Rendering,
}

impl fmt::Display for RunStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunStage::Transcribing => "transcribing",
            RunStage::Extracting => "extracting",
            RunStage::Answering => "answering",
            RunStage::Combining => "combining",
            RunStage::Rendering => "rendering",
        };
        f.write_str(name)
    }
}
