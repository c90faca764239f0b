use crate::application::{ServiceDependencies, book, loan};
use crate::domain::{BookId, LoanId, commands::*};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Local;
use std::sync::Arc;
use validator::Validate;

use super::{
    error::ApiError,
    types::{
        BookResponse, BookSearchQuery, CreateBookRequest, CreateLoanRequest, LoanCreatedResponse,
        LoanResponse, LoanSearchQuery, PageQuery, PageResponse, ReturnedLoanRequest,
        UpdateBookRequest, validation_messages,
    },
};

// ============================================================================
// State
// ============================================================================

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub service_deps: ServiceDependencies,
}

fn validate(req: &impl Validate) -> Result<(), ApiError> {
    req.validate()
        .map_err(|errors| ApiError::Validation(validation_messages(&errors)))
}

// ============================================================================
// Book handlers
// ============================================================================

/// POST /api/books - 書籍を登録
///
/// ISBNが登録済みの場合は400を返す。
pub async fn create_book(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateBookRequest>,
) -> Result<(StatusCode, Json<BookResponse>), ApiError> {
    validate(&req)?;
    tracing::info!(isbn = %req.isbn, "creating book");

    let cmd = CreateBook {
        title: req.title,
        author: req.author,
        isbn: req.isbn,
    };
    let book = book::create_book(&state.service_deps, cmd).await?;

    Ok((StatusCode::CREATED, Json(BookResponse::from(book))))
}

/// GET /api/books/:id - 書籍をIDで取得
pub async fn get_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<BookResponse>, ApiError> {
    let book = book::get_book_by_id(&state.service_deps, BookId::new(id))
        .await?
        .ok_or(ApiError::NotFound("Book not found."))?;

    Ok(Json(BookResponse::from(book)))
}

/// PUT /api/books/:id - 書籍のタイトルと著者を更新
pub async fn update_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateBookRequest>,
) -> Result<Json<BookResponse>, ApiError> {
    validate(&req)?;
    tracing::info!(book_id = id, "updating book");

    let current = book::get_book_by_id(&state.service_deps, BookId::new(id))
        .await?
        .ok_or(ApiError::NotFound("Book not found."))?;

    let updated = book::revise_book(&state.service_deps, current, req.title, req.author).await?;

    Ok(Json(BookResponse::from(updated)))
}

/// DELETE /api/books/:id - 書籍を削除
///
/// 貸出履歴がある書籍は削除できない（400）。
pub async fn delete_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let current = book::get_book_by_id(&state.service_deps, BookId::new(id))
        .await?
        .ok_or(ApiError::NotFound("Book not found."))?;

    book::delete_book(&state.service_deps, &current).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/books - 書籍を検索
///
/// クエリパラメータ:
/// - title, author, isbn: 部分一致（大文字小文字を区別しない）。空は無視
/// - page, size: ページング
pub async fn find_books(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BookSearchQuery>,
) -> Result<Json<PageResponse<BookResponse>>, ApiError> {
    let page = book::find_books(
        &state.service_deps,
        &query.to_filter(),
        query.to_page_request(),
    )
    .await?;

    Ok(Json(page.into()))
}

/// GET /api/books/:id/loans - 書籍の貸出履歴を取得
pub async fn loans_by_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PageResponse<LoanResponse>>, ApiError> {
    let current = book::get_book_by_id(&state.service_deps, BookId::new(id))
        .await?
        .ok_or(ApiError::NotFound("Book not found."))?;

    let page =
        loan::get_loans_by_book(&state.service_deps, &current, query.to_page_request()).await?;

    Ok(Json(page.into()))
}

// ============================================================================
// Loan handlers
// ============================================================================

/// POST /api/loans - 書籍を貸し出す
///
/// 貸出日は今日。強制されるビジネスルール:
/// - ISBNに一致する書籍が存在すること
/// - 書籍が貸出中でないこと
pub async fn create_loan(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateLoanRequest>,
) -> Result<(StatusCode, Json<LoanCreatedResponse>), ApiError> {
    validate(&req)?;
    tracing::info!(isbn = %req.isbn, "creating loan");

    let cmd = LoanBook {
        isbn: req.isbn,
        customer: req.customer,
        customer_email: req.customer_email,
        loan_date: Local::now().date_naive(),
    };
    let saved = loan::loan_book(&state.service_deps, cmd).await?;

    let id = saved.id.ok_or(ApiError::Internal("saved loan has no id"))?;

    Ok((
        StatusCode::CREATED,
        Json(LoanCreatedResponse { id: id.value() }),
    ))
}

/// PATCH /api/loans/:id - 返却フラグを更新
pub async fn return_loan(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<ReturnedLoanRequest>,
) -> Result<Json<LoanResponse>, ApiError> {
    tracing::info!(loan_id = id, returned = req.returned, "updating returned flag");

    let updated = loan::return_loan(&state.service_deps, LoanId::new(id), req.returned).await?;

    Ok(Json(LoanResponse::from(updated)))
}

/// GET /api/loans - 貸出を検索
///
/// クエリパラメータ:
/// - isbn: 書籍のISBNが一致
/// - customer: 顧客名が一致
///
/// 2つの条件はORで結合される。
pub async fn find_loans(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LoanSearchQuery>,
) -> Result<Json<PageResponse<LoanResponse>>, ApiError> {
    let page = loan::find_loans(
        &state.service_deps,
        &query.to_filter(),
        query.to_page_request(),
    )
    .await?;

    Ok(Json(page.into()))
}
