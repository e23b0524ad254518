//! Pure stage functions
//!
//! The combine stage is the only stage with no external capability behind it,
//! so it lives here as a plain function. The model-backed stages are methods
//! on the `LanguageModel` capability adapter.

use crate::pipeline::types::QaPair;

/// Combine gathered question/answer pairs into one markdown document.
///
/// Deterministic: for each pair, numbered by its position in the gathered
/// collection (1-based), emit a bold "Question N" line and a bold "Answer"
/// line separated by blank lines. Zero pairs produce an empty document.
///
/// Note: the position reflects arrival order of the concurrent answer
/// branches, which may differ from the question order in the source paper.
pub fn combine_results(pairs: &[QaPair]) -> String {
    let mut document = String::new();
    for (index, pair) in pairs.iter().enumerate() {
        document.push_str(&format!(
            "**Question {}:** {}\n\n",
            index + 1,
            pair.question
        ));
        document.push_str(&format!("**Answer:** {}\n\n\n", pair.answer));
    }
    document
}
