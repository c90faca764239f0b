use crate::domain::{Book, BookFilter, BookId, Loan, LoanId, Page, PageRequest, ReturnStatus};
use crate::ports::{BookRepository, LoanRepository, Result, WriteOutcome};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::Mutex;

/// 保存済みの貸出（書籍はIDのみ保持し、読み出し時に結合する）
#[derive(Debug, Clone)]
struct StoredLoan {
    book_id: BookId,
    customer: String,
    customer_email: Option<String>,
    loan_date: NaiveDate,
    returned: ReturnStatus,
}

#[derive(Debug, Default)]
struct State {
    books: BTreeMap<BookId, Book>,
    loans: BTreeMap<LoanId, StoredLoan>,
    next_book_id: i64,
    next_loan_id: i64,
}

impl State {
    fn load_loan(&self, id: LoanId, stored: &StoredLoan) -> Option<Loan> {
        let book = self.books.get(&stored.book_id)?.clone();
        Some(Loan {
            id: Some(id),
            book,
            customer: stored.customer.clone(),
            customer_email: stored.customer_email.clone(),
            loan_date: stored.loan_date,
            returned: stored.returned,
        })
    }

    fn loans_where(&self, predicate: impl Fn(&Loan) -> bool) -> Vec<Loan> {
        self.loans
            .iter()
            .filter_map(|(id, stored)| self.load_loan(*id, stored))
            .filter(|loan| predicate(loan))
            .collect()
    }

    /// 書籍に貸出中の貸出があるか（except は判定から除外する貸出）
    fn has_active_loan(&self, book_id: BookId, except: Option<LoanId>) -> bool {
        self.loans.iter().any(|(id, loan)| {
            Some(*id) != except && loan.book_id == book_id && loan.returned.is_open()
        })
    }
}

/// 書籍カタログと貸出台帳のインメモリ実装
///
/// リレーショナルストアと同じ制約を持つ：
/// - ISBNの一意制約
/// - 書籍ごとに貸出中は1件までの部分一意制約
/// - 貸出から参照されている書籍は削除できない外部キー制約
///
/// 1つのインスタンスを`BookRepository`と`LoanRepository`の両方として渡す。
pub struct LibraryStore {
    state: Mutex<State>,
}

impl LibraryStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
        }
    }

    /// テスト用に保存済みの貸出件数を取得
    pub fn loan_count(&self) -> usize {
        self.state.lock().unwrap().loans.len()
    }

    /// テスト用に保存済みの書籍件数を取得
    pub fn book_count(&self) -> usize {
        self.state.lock().unwrap().books.len()
    }
}

impl Default for LibraryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookRepository for LibraryStore {
    async fn exists_by_isbn(&self, isbn: &str) -> Result<bool> {
        let state = self.state.lock().unwrap();
        Ok(state.books.values().any(|b| b.isbn == isbn))
    }

    async fn find_by_isbn(&self, isbn: &str) -> Result<Option<Book>> {
        let state = self.state.lock().unwrap();
        Ok(state.books.values().find(|b| b.isbn == isbn).cloned())
    }

    async fn get_by_id(&self, id: BookId) -> Result<Option<Book>> {
        let state = self.state.lock().unwrap();
        Ok(state.books.get(&id).cloned())
    }

    async fn insert(&self, book: &Book) -> Result<WriteOutcome<Book>> {
        let mut state = self.state.lock().unwrap();
        if state.books.values().any(|b| b.isbn == book.isbn) {
            return Ok(WriteOutcome::Conflict);
        }

        state.next_book_id += 1;
        let id = BookId::new(state.next_book_id);
        let saved = Book {
            id: Some(id),
            ..book.clone()
        };
        state.books.insert(id, saved.clone());
        Ok(WriteOutcome::Written(saved))
    }

    async fn update(&self, id: BookId, book: &Book) -> Result<Option<Book>> {
        let mut state = self.state.lock().unwrap();
        Ok(state.books.get_mut(&id).map(|stored| {
            stored.title = book.title.clone();
            stored.author = book.author.clone();
            stored.clone()
        }))
    }

    async fn delete(&self, id: BookId) -> Result<WriteOutcome<bool>> {
        let mut state = self.state.lock().unwrap();
        if state.loans.values().any(|l| l.book_id == id) {
            return Ok(WriteOutcome::Conflict);
        }
        Ok(WriteOutcome::Written(state.books.remove(&id).is_some()))
    }

    async fn find(&self, filter: &BookFilter, page: PageRequest) -> Result<Page<Book>> {
        let state = self.state.lock().unwrap();
        let matched: Vec<Book> = state
            .books
            .values()
            .filter(|b| filter.matches(b))
            .cloned()
            .collect();
        Ok(Page::slice(matched, page))
    }
}

#[async_trait]
impl LoanRepository for LibraryStore {
    async fn exists_active_loan_for_book(&self, book_id: BookId) -> Result<bool> {
        let state = self.state.lock().unwrap();
        Ok(state.has_active_loan(book_id, None))
    }

    async fn get_by_id(&self, id: LoanId) -> Result<Option<Loan>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .loans
            .get(&id)
            .and_then(|stored| state.load_loan(id, stored)))
    }

    async fn insert(&self, loan: &Loan) -> Result<WriteOutcome<Loan>> {
        let book_id = loan.book.require_id().map_err(|e| e.message())?;

        let mut state = self.state.lock().unwrap();
        if !state.books.contains_key(&book_id) {
            return Err(format!("book {} does not exist", book_id.value()).into());
        }
        if loan.returned.is_open() && state.has_active_loan(book_id, None) {
            return Ok(WriteOutcome::Conflict);
        }

        state.next_loan_id += 1;
        let id = LoanId::new(state.next_loan_id);
        let stored = StoredLoan {
            book_id,
            customer: loan.customer.clone(),
            customer_email: loan.customer_email.clone(),
            loan_date: loan.loan_date,
            returned: loan.returned,
        };
        let saved = state
            .load_loan(id, &stored)
            .ok_or("book disappeared while saving loan")?;
        state.loans.insert(id, stored);
        Ok(WriteOutcome::Written(saved))
    }

    async fn update(&self, id: LoanId, loan: &Loan) -> Result<Option<WriteOutcome<Loan>>> {
        let mut state = self.state.lock().unwrap();
        let Some(book_id) = state.loans.get(&id).map(|l| l.book_id) else {
            return Ok(None);
        };
        if loan.returned.is_open() && state.has_active_loan(book_id, Some(id)) {
            return Ok(Some(WriteOutcome::Conflict));
        }

        if let Some(stored) = state.loans.get_mut(&id) {
            stored.customer = loan.customer.clone();
            stored.customer_email = loan.customer_email.clone();
            stored.loan_date = loan.loan_date;
            stored.returned = loan.returned;
        }
        Ok(state
            .loans
            .get(&id)
            .and_then(|stored| state.load_loan(id, stored))
            .map(WriteOutcome::Written))
    }

    async fn find_by_isbn_or_customer(
        &self,
        isbn: Option<&str>,
        customer: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<Loan>> {
        let state = self.state.lock().unwrap();
        let matched = state.loans_where(|loan| {
            isbn.is_some_and(|i| loan.book.isbn == i)
                || customer.is_some_and(|c| loan.customer == c)
        });
        Ok(Page::slice(matched, page))
    }

    async fn find_by_book(&self, book_id: BookId, page: PageRequest) -> Result<Page<Loan>> {
        let state = self.state.lock().unwrap();
        let matched = state.loans_where(|loan| loan.book.id == Some(book_id));
        Ok(Page::slice(matched, page))
    }

    async fn find_overdue_unreturned(&self, cutoff: NaiveDate) -> Result<Vec<Loan>> {
        let state = self.state.lock().unwrap();
        Ok(state.loans_where(|loan| loan.is_active() && loan.loan_date <= cutoff))
    }
}
