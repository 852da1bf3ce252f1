use axum::extract::Request;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use travlr_core::error::AppError;

use crate::dto::{ErrorDetails, ErrorResponse};

const INTERNAL_MESSAGE: &str = "Internal server error";

/// Wrapper so we can implement `IntoResponse` for `AppError`.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(AppError::BadRequest(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(AppError::BadRequest(rejection.body_text()))
    }
}

/// Text of the error behind a 500, carried as a response extension so
/// [`reveal_internal_errors`] can surface it in development.
#[derive(Debug, Clone)]
struct InternalErrorText(String);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            AppError::ValidationError(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::MissingToken
            | AppError::Unauthorized(_)
            | AppError::MalformedAuthHeader
            | AppError::ExpiredToken
            | AppError::InvalidToken
            | AppError::InvalidRefreshToken
            | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable `error` field of the response body.
    pub fn code(&self) -> &'static str {
        match &self.0 {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::MissingToken | AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::MalformedAuthHeader => "INVALID_TOKEN_FORMAT",
            AppError::ExpiredToken => "TOKEN_EXPIRED",
            AppError::InvalidToken => "INVALID_TOKEN",
            AppError::InvalidRefreshToken => "INVALID_REFRESH_TOKEN",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::Forbidden { .. } => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict { .. } => "DUPLICATE_KEY",
            _ => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = self.code();

        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
            let body = ErrorResponse {
                message: INTERNAL_MESSAGE.to_string(),
                error,
                details: None,
            };
            let mut response = (status, axum::Json(body)).into_response();
            response
                .extensions_mut()
                .insert(InternalErrorText(self.0.to_string()));
            return response;
        }

        let message = self.0.to_string();
        let details = match self.0 {
            AppError::ValidationError(errors) => {
                Some(ErrorDetails::Fields(errors.errors().to_vec()))
            }
            AppError::Forbidden { required, actual } => Some(ErrorDetails::Roles {
                required_roles: required,
                user_role: actual,
            }),
            AppError::Conflict { field } => Some(ErrorDetails::Field { field }),
            _ => None,
        };

        let body = ErrorResponse {
            message,
            error,
            details,
        };
        (status, axum::Json(body)).into_response()
    }
}

/// Development-only layer: re-renders 500 bodies with the underlying error text.
pub async fn reveal_internal_errors(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    match response.extensions_mut().remove::<InternalErrorText>() {
        Some(InternalErrorText(text)) => {
            let body = ErrorResponse {
                message: INTERNAL_MESSAGE.to_string(),
                error: "INTERNAL_SERVER_ERROR",
                details: Some(ErrorDetails::Internal(text)),
            };
            (response.status(), axum::Json(body)).into_response()
        }
        None => response,
    }
}
