//! Upload endpoint
//!
//! Accepts one question-paper image as multipart form data, drives a pipeline
//! run, and streams back the rendered PDF as an attachment. The image never
//! touches disk; it is base64-encoded in memory and handed to the pipeline.

use crate::error::AppError;
use crate::pipeline::graph;
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::{info, warn};

/// Handle `POST /upload`
///
/// Expects a multipart form with a single file field named `image`. Responds
/// with `200` and the PDF bytes on success, `400` when no file is present,
/// and `500` when any pipeline stage fails.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let image = read_image_field(&mut multipart).await?;
    info!(image_len = image.len(), "Image received");

    let image_base64 = STANDARD.encode(&image);
    let pdf = graph::run(state.model, state.renderer, image_base64).await?;

    let headers = [
        (header::CONTENT_TYPE, "application/pdf"),
        (
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"output.pdf\"",
        ),
    ];
    Ok((headers, pdf).into_response())
}

/// Pull the `image` file field out of the multipart stream.
///
/// A missing or empty file, or a malformed multipart body, is an upload
/// error; the pipeline and its capability adapters are never invoked.
async fn read_image_field(multipart: &mut Multipart) -> Result<Bytes, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Upload(format!("malformed multipart body: {}", e)))?
    {
        let field_name = field.name().unwrap_or("").to_string();
        if field_name != "image" {
            warn!(field = %field_name, "Ignoring unknown multipart field");
            continue;
        }
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Upload(format!("failed to read image field: {}", e)))?;
        if data.is_empty() {
            return Err(AppError::Upload("image field is empty".to_string()));
        }
        return Ok(data);
    }
    Err(AppError::Upload("no image file in request".to_string()))
}
