//! Extractors that report rejections through [`AppError`].
//!
//! axum's own `Json` and `Path` answer malformed input with plain-text
//! bodies; these wrappers keep every failure in the JSON error envelope.

use crate::error::AppError;
use axum::extract::{FromRequest, FromRequestParts};

/// JSON request body. Malformed, mistyped or incomplete bodies become
/// [`AppError::BadRequest`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Path parameters. Unparsable segments become [`AppError::BadRequest`].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);
