use crate::application::ServiceDependencies;
use crate::domain::{self, Book, Loan, LoanFilter, LoanId, Page, PageRequest, commands::*};
use crate::ports::WriteOutcome;
use chrono::{Local, NaiveDate};

use super::errors::{LoanApplicationError, Result};

/// 貸出を保存する
///
/// ビジネスルール：
/// - 1冊の書籍につき、貸出中（返却フラグがNULLまたはfalse）の貸出は1件まで
/// - 書籍は保存済み（ID採番済み）であること
///
/// 貸出中の貸出の存在確認を行ってから挿入する。
/// 挿入はストア側の部分一意制約で守られた条件付き書き込みであり、
/// 確認と挿入の間に別の貸出が作られた場合も`BookAlreadyLoaned`になる。
///
/// # 戻り値
/// ID採番済みの貸出
pub async fn save_loan(deps: &ServiceDependencies, loan: Loan) -> Result<Loan> {
    let book_id = loan.book.require_id()?;

    // 1. 貸出中の貸出の存在確認
    let already_loaned = deps
        .loan_repository
        .exists_active_loan_for_book(book_id)
        .await
        .map_err(LoanApplicationError::LoanRepositoryError)?;

    if already_loaned {
        tracing::warn!(book_id = book_id.value(), "rejected loan of a book already loaned");
        return Err(LoanApplicationError::BookAlreadyLoaned);
    }

    // 2. 条件付き挿入
    match deps
        .loan_repository
        .insert(&loan)
        .await
        .map_err(LoanApplicationError::LoanRepositoryError)?
    {
        WriteOutcome::Written(saved) => Ok(saved),
        WriteOutcome::Conflict => Err(LoanApplicationError::BookAlreadyLoaned),
    }
}

/// ISBNで指定した書籍を貸し出す
///
/// 書籍をISBNで引き当ててから貸出を作成し、`save_loan`で保存する。
///
/// # エラー
/// - BookNotFoundForIsbn: ISBNに一致する書籍がない
/// - BookAlreadyLoaned: 書籍が貸出中
pub async fn loan_book(deps: &ServiceDependencies, cmd: LoanBook) -> Result<Loan> {
    let book = deps
        .book_repository
        .find_by_isbn(cmd.isbn.trim())
        .await
        .map_err(LoanApplicationError::BookRepositoryError)?
        .ok_or(LoanApplicationError::BookNotFoundForIsbn)?;

    let loan = domain::loan::open_loan(book, cmd.customer, cmd.customer_email, cmd.loan_date);
    save_loan(deps, loan).await
}

/// IDで貸出を取得する
pub async fn get_loan_by_id(deps: &ServiceDependencies, id: LoanId) -> Result<Option<Loan>> {
    deps.loan_repository
        .get_by_id(id)
        .await
        .map_err(LoanApplicationError::LoanRepositoryError)
}

/// 貸出の状態をそのまま保存する
///
/// 返却フラグの更新に使われる。返却済みへの変更は常に許可され、
/// 不変条件の再確認は行わない。ただし返却済みの貸出を貸出中に戻した結果、
/// 同じ書籍の貸出中が2件になる場合はストアが拒否し`BookAlreadyLoaned`になる。
///
/// # エラー
/// - InvalidArgument: IDが未採番
/// - LoanNotFound: 該当する貸出が存在しない
pub async fn update_loan(deps: &ServiceDependencies, loan: Loan) -> Result<Loan> {
    let id = loan.require_id()?;

    match deps
        .loan_repository
        .update(id, &loan)
        .await
        .map_err(LoanApplicationError::LoanRepositoryError)?
    {
        Some(WriteOutcome::Written(updated)) => Ok(updated),
        Some(WriteOutcome::Conflict) => Err(LoanApplicationError::BookAlreadyLoaned),
        None => Err(LoanApplicationError::LoanNotFound),
    }
}

/// 貸出の返却フラグを設定する
///
/// # エラー
/// - LoanNotFound: 該当する貸出が存在しない
pub async fn return_loan(deps: &ServiceDependencies, id: LoanId, returned: bool) -> Result<Loan> {
    let loan = get_loan_by_id(deps, id)
        .await?
        .ok_or(LoanApplicationError::LoanNotFound)?;

    update_loan(deps, domain::loan::mark_returned(loan, returned)).await
}

/// 貸出を検索する
///
/// 書籍のISBNが一致する貸出と、顧客名が一致する貸出の和集合（OR条件）を返す。
/// 条件が1つも指定されていない場合は空のページを返す。
pub async fn find_loans(
    deps: &ServiceDependencies,
    filter: &LoanFilter,
    page: PageRequest,
) -> Result<Page<Loan>> {
    if filter.is_empty() {
        return Ok(Page::empty(page));
    }

    deps.loan_repository
        .find_by_isbn_or_customer(filter.isbn(), filter.customer(), page)
        .await
        .map_err(LoanApplicationError::LoanRepositoryError)
}

/// 書籍のすべての貸出（返却済みを含む）を取得する
pub async fn get_loans_by_book(
    deps: &ServiceDependencies,
    book: &Book,
    page: PageRequest,
) -> Result<Page<Loan>> {
    let book_id = book.require_id()?;

    deps.loan_repository
        .find_by_book(book_id, page)
        .await
        .map_err(LoanApplicationError::LoanRepositoryError)
}

/// 延滞中の貸出をすべて取得する
///
/// 今日（ローカル日付）を基準に`find_late_loans`を呼ぶ。
pub async fn get_all_late_loans(deps: &ServiceDependencies) -> Result<Vec<Loan>> {
    find_late_loans(deps, Local::now().date_naive()).await
}

/// 指定日を基準に延滞中の貸出をすべて取得する
///
/// 貸出日が「today - 4日」以前で、返却フラグがNULLまたはfalseの貸出を返す。
/// バッチ用のためページングしない。
pub async fn find_late_loans(deps: &ServiceDependencies, today: NaiveDate) -> Result<Vec<Loan>> {
    let cutoff = domain::loan::late_loan_cutoff(today);

    deps.loan_repository
        .find_overdue_unreturned(cutoff)
        .await
        .map_err(LoanApplicationError::LoanRepositoryError)
}
