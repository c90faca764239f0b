use crate::application::{book::BookApplicationError, loan::LoanApplicationError};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::types::ErrorResponse;

/// API層のエラー型
///
/// アプリケーション層のエラーをラップし、HTTPレスポンスへのマッピングを提供する。
#[derive(Debug)]
pub enum ApiError {
    Book(BookApplicationError),
    Loan(LoanApplicationError),
    /// リクエストのバリデーション失敗
    Validation(Vec<String>),
    /// パスで指定されたリソースが存在しない
    NotFound(&'static str),
    /// 発生しないはずの内部状態
    Internal(&'static str),
}

impl From<BookApplicationError> for ApiError {
    fn from(err: BookApplicationError) -> Self {
        ApiError::Book(err)
    }
}

impl From<LoanApplicationError> for ApiError {
    fn from(err: LoanApplicationError) -> Self {
        ApiError::Loan(err)
    }
}

/// 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
fn internal_error(err: &dyn std::error::Error) -> (StatusCode, ErrorResponse) {
    tracing::error!(error = %err, source = ?std::error::Error::source(err), "internal error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        ErrorResponse::new("An unexpected error occurred"),
    )
}

fn rejection(status: StatusCode, err: &dyn std::error::Error) -> (StatusCode, ErrorResponse) {
    (status, ErrorResponse::new(err.to_string()))
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::Validation(messages) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::from_messages(messages.clone()),
            ),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, ErrorResponse::new(*message)),
            ApiError::Internal(detail) => {
                tracing::error!(detail = *detail, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("An unexpected error occurred"),
                )
            }

            ApiError::Book(err) => match err {
                // 400 Bad Request - ビジネスルール違反・不正な引数
                BookApplicationError::DuplicateIsbn
                | BookApplicationError::BookHasLoans
                | BookApplicationError::InvalidArgument(_) => {
                    rejection(StatusCode::BAD_REQUEST, err)
                }
                // 404 Not Found
                BookApplicationError::BookNotFound => rejection(StatusCode::NOT_FOUND, err),
                // 500 Internal Server Error - システム障害
                BookApplicationError::RepositoryError(_) => internal_error(err),
            },

            ApiError::Loan(err) => match err {
                LoanApplicationError::BookAlreadyLoaned
                | LoanApplicationError::BookNotFoundForIsbn
                | LoanApplicationError::InvalidArgument(_) => {
                    rejection(StatusCode::BAD_REQUEST, err)
                }
                LoanApplicationError::LoanNotFound => rejection(StatusCode::NOT_FOUND, err),
                LoanApplicationError::BookRepositoryError(_)
                | LoanApplicationError::LoanRepositoryError(_)
                | LoanApplicationError::TransportError(_) => internal_error(err),
            },
        };

        (status, Json(body)).into_response()
    }
}
