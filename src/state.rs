//! Application state
//!
//! Immutable handles shared by all requests: the model capability adapter and
//! the document renderer. Each upload spawns its own independent pipeline run;
//! no mutable state crosses requests.

use crate::model::LanguageModel;
use crate::render::DocumentRenderer;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Language model capability adapter
    pub model: Arc<dyn LanguageModel>,
    /// Document renderer adapter
    pub renderer: Arc<dyn DocumentRenderer>,
}

impl AppState {
    /// Create new application state from capability adapters
    pub fn new(model: Arc<dyn LanguageModel>, renderer: Arc<dyn DocumentRenderer>) -> Self {
        Self { model, renderer }
    }
}
