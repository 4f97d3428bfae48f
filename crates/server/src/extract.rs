//! Request extractors.

use axum::extract::FromRequest;

use crate::error::AppError;

/// JSON request body whose rejections answer like every other error:
/// status 400 with an `{"error": ...}` body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
