/// 永続化前のエンティティに対する操作のエラー
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityError {
    /// 書籍IDが未採番
    BookIdMissing,
    /// 貸出IDが未採番
    LoanIdMissing,
}

impl IdentityError {
    pub fn message(&self) -> &'static str {
        match self {
            IdentityError::BookIdMissing => "Book id must be assigned.",
            IdentityError::LoanIdMissing => "Loan id must be assigned.",
        }
    }
}
