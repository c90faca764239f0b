use axum::{
    Router,
    routing::{get, patch, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, create_book, create_loan, delete_book, find_books, find_loans, get_book,
    loans_by_book, return_loan, update_book,
};

/// 書籍・貸出エンドポイントを持つAPIルーターを作成する
///
/// Books:
/// - POST /api/books - 書籍を登録
/// - GET /api/books - 書籍を検索
/// - GET /api/books/:id - 書籍を取得
/// - PUT /api/books/:id - 書籍を更新
/// - DELETE /api/books/:id - 書籍を削除
/// - GET /api/books/:id/loans - 書籍の貸出履歴
///
/// Loans:
/// - POST /api/loans - 書籍を貸し出す
/// - GET /api/loans - 貸出を検索
/// - PATCH /api/loans/:id - 返却フラグを更新
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        .route("/api/books", post(create_book).get(find_books))
        .route(
            "/api/books/:id",
            get(get_book).put(update_book).delete(delete_book),
        )
        .route("/api/books/:id/loans", get(loans_by_book))
        .route("/api/loans", post(create_loan).get(find_loans))
        .route("/api/loans/:id", patch(return_loan))
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
        // Add application state
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
