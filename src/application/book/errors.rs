use crate::domain::IdentityError;
use thiserror::Error;

/// 書籍カタログアプリケーション層のエラー
#[derive(Debug, Error)]
pub enum BookApplicationError {
    /// ISBNが登録済み（DuplicateKey）
    #[error("Isbn already registered.")]
    DuplicateIsbn,

    /// 未保存の書籍に対する操作（InvalidArgument）
    #[error("{}", .0.message())]
    InvalidArgument(IdentityError),

    /// 書籍が見つからない
    #[error("Book not found.")]
    BookNotFound,

    /// 貸出から参照されている書籍は削除できない（BusinessRule）
    #[error("Book has loans.")]
    BookHasLoans,

    /// BookRepositoryのエラー
    #[error("Book repository error")]
    RepositoryError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<IdentityError> for BookApplicationError {
    fn from(err: IdentityError) -> Self {
        BookApplicationError::InvalidArgument(err)
    }
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, BookApplicationError>;
