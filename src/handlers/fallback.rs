use axum::http::{Method, Uri};

use crate::types::AppError;

pub async fn not_found(method: Method, uri: Uri) -> AppError {
    AppError::not_found(format!("No route for {} {}", method, uri.path()))
}
