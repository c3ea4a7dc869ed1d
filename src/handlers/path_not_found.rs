use axum::http::{Method, Uri};

use crate::model::error::ApiError;

pub async fn handler_404(method: Method, uri: Uri) -> ApiError {
    ApiError::PathNotFound(format!("{} {}", method, uri))
}
