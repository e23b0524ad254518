//! Question-paper pipeline
//!
//! Five-stage pipeline turning an uploaded question-paper image into a PDF of
//! study notes: transcribe, extract questions, generate one answer per question
//! (fan-out), combine the results into markdown (fan-in), render to PDF.

pub mod graph;
pub mod stages;
pub mod types;

pub use types::{QaPair, Question, RunStage};
