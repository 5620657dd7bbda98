//! Extractors whose rejections render as `ErrorResponse` bodies

use crate::core::error::ChapterError;
use axum::extract::FromRequest;

/// JSON body extractor; a malformed or incomplete body becomes
/// `ChapterError::InvalidRequest` instead of axum's plain-text rejection
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ChapterError))]
pub struct AppJson<T>(pub T);
