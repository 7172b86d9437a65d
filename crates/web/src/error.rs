//! Turning service errors into error pages.

use axum::response::{IntoResponse, Response};
use yatube_common::AppError;

use crate::templates::core::{self, ErrorContext};

/// An error rendered as an HTML page.
#[derive(Debug)]
pub struct PageError(pub AppError);

/// Result of a page handler.
pub type PageResult<T = Response> = Result<T, PageError>;

impl From<AppError> for PageError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status = err.status_code();

        if err.is_server_error() {
            tracing::error!(error = %err, code = err.error_code(), "Server error");
            return core::server_error(&ErrorContext {
                status: status.as_u16(),
                message: String::new(),
                path: None,
            });
        }

        tracing::debug!(error = %err, code = err.error_code(), "Client error");
        let ctx = ErrorContext {
            status: status.as_u16(),
            message: client_message(&err),
            path: None,
        };
        if err.is_not_found() {
            core::not_found(&ctx, None)
        } else {
            core::error(&ctx, None)
        }
    }
}

fn client_message(err: &AppError) -> String {
    match err {
        AppError::NotFound(_)
        | AppError::UserNotFound(_)
        | AppError::PostNotFound(_)
        | AppError::GroupNotFound(_) => "The requested page does not exist.".to_string(),
        AppError::Unauthorized => "Please log in.".to_string(),
        AppError::Forbidden(msg)
        | AppError::BadRequest(msg)
        | AppError::Validation(msg)
        | AppError::Conflict(msg) => msg.clone(),
        AppError::Database(_) | AppError::Storage(_) | AppError::Config(_) | AppError::Internal(_) => {
            String::new()
        }
    }
}
