use crate::domain::{BookId, Loan, LoanId, Page, PageRequest};
use async_trait::async_trait;
use chrono::NaiveDate;

use super::{Result, WriteOutcome};

/// 貸出台帳ストアポート
///
/// 不変条件：1冊の書籍につき、返却フラグがNULLまたはfalseの貸出は1件まで。
/// ストアはこの条件を原子的に保証し、違反する書き込みには`Conflict`を返す。
#[async_trait]
pub trait LoanRepository: Send + Sync {
    /// 書籍に貸出中（未返却）の貸出があるか確認する
    async fn exists_active_loan_for_book(&self, book_id: BookId) -> Result<bool>;

    /// IDで貸出を取得する
    async fn get_by_id(&self, id: LoanId) -> Result<Option<Loan>>;

    /// 貸出を新規登録し、ID採番済みの貸出を返す
    ///
    /// 同じ書籍に貸出中の貸出がある場合は挿入せずに`Conflict`を返す。
    async fn insert(&self, loan: &Loan) -> Result<WriteOutcome<Loan>>;

    /// 貸出の状態を上書きする
    ///
    /// 該当行がない場合は`None`を返す。
    async fn update(&self, id: LoanId, loan: &Loan) -> Result<Option<WriteOutcome<Loan>>>;

    /// 書籍のISBNが一致する、または顧客名が一致する貸出を検索する（OR条件）
    async fn find_by_isbn_or_customer(
        &self,
        isbn: Option<&str>,
        customer: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<Loan>>;

    /// 書籍のすべての貸出（返却済みを含む）を検索する
    async fn find_by_book(&self, book_id: BookId, page: PageRequest) -> Result<Page<Loan>>;

    /// 貸出日がcutoff以前で未返却の貸出を検索する
    ///
    /// 延滞通知バッチで使用される。
    async fn find_overdue_unreturned(&self, cutoff: NaiveDate) -> Result<Vec<Loan>>;
}
