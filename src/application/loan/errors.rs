use crate::domain::IdentityError;
use thiserror::Error;

/// 貸出管理アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum LoanApplicationError {
    /// 書籍が既に貸出中（BusinessRule）
    #[error("Book already loaned.")]
    BookAlreadyLoaned,

    /// 貸出対象の書籍がISBNで見つからない
    #[error("Book not found for passed isbn.")]
    BookNotFoundForIsbn,

    /// 未保存のエンティティに対する操作（InvalidArgument）
    #[error("{}", .0.message())]
    InvalidArgument(IdentityError),

    /// 貸出が見つからない
    #[error("Loan not found.")]
    LoanNotFound,

    /// BookRepositoryのエラー
    #[error("Book repository error")]
    BookRepositoryError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// LoanRepositoryのエラー
    #[error("Loan repository error")]
    LoanRepositoryError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// メール送信の失敗（TransportError）
    #[error("Mail transport error")]
    TransportError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<IdentityError> for LoanApplicationError {
    fn from(err: IdentityError) -> Self {
        LoanApplicationError::InvalidArgument(err)
    }
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, LoanApplicationError>;
