use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use crate::domain::{Book, BookFilter, Loan, LoanFilter, Page, PageRequest};

// ============================================================================
// Requests
// ============================================================================

/// 書籍登録リクエスト（POST /api/books）
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBookRequest {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "author must not be empty"))]
    pub author: String,
    #[validate(length(min = 1, message = "isbn must not be empty"))]
    pub isbn: String,
}

/// 書籍更新リクエスト（PUT /api/books/:id）
///
/// ISBNは登録後に変更できないため受け付けない。
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateBookRequest {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "author must not be empty"))]
    pub author: String,
}

/// 貸出作成リクエスト（POST /api/loans）
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLoanRequest {
    #[validate(length(min = 1, message = "isbn must not be empty"))]
    pub isbn: String,
    #[validate(length(min = 1, message = "customer must not be empty"))]
    pub customer: String,
    #[validate(email(message = "customer_email must be a valid email address"))]
    pub customer_email: Option<String>,
}

/// 返却フラグ更新リクエスト（PATCH /api/loans/:id）
#[derive(Debug, Deserialize)]
pub struct ReturnedLoanRequest {
    pub returned: bool,
}

/// ページングのクエリパラメータ
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl PageQuery {
    pub fn to_page_request(&self) -> PageRequest {
        page_request(self.page, self.size)
    }
}

/// 書籍検索のクエリパラメータ（GET /api/books）
#[derive(Debug, Default, Deserialize)]
pub struct BookSearchQuery {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl BookSearchQuery {
    pub fn to_filter(&self) -> BookFilter {
        BookFilter {
            title: self.title.clone(),
            author: self.author.clone(),
            isbn: self.isbn.clone(),
        }
    }

    pub fn to_page_request(&self) -> PageRequest {
        page_request(self.page, self.size)
    }
}

/// 貸出検索のクエリパラメータ（GET /api/loans）
#[derive(Debug, Default, Deserialize)]
pub struct LoanSearchQuery {
    pub isbn: Option<String>,
    pub customer: Option<String>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl LoanSearchQuery {
    pub fn to_filter(&self) -> LoanFilter {
        LoanFilter {
            isbn: self.isbn.clone(),
            customer: self.customer.clone(),
        }
    }

    pub fn to_page_request(&self) -> PageRequest {
        page_request(self.page, self.size)
    }
}

fn page_request(page: Option<u32>, size: Option<u32>) -> PageRequest {
    let default = PageRequest::default();
    PageRequest::new(
        page.unwrap_or(default.page()),
        size.unwrap_or(default.size()),
    )
}

// ============================================================================
// Responses
// ============================================================================

/// 書籍レスポンス
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookResponse {
    pub id: Option<i64>,
    pub title: String,
    pub author: String,
    pub isbn: String,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            id: book.id.map(|id| id.value()),
            title: book.title,
            author: book.author,
            isbn: book.isbn,
        }
    }
}

/// 貸出レスポンス（書籍を含む）
#[derive(Debug, Serialize, Deserialize)]
pub struct LoanResponse {
    pub id: Option<i64>,
    pub isbn: String,
    pub customer: String,
    pub customer_email: Option<String>,
    pub loan_date: NaiveDate,
    pub returned: Option<bool>,
    pub book: BookResponse,
}

impl From<Loan> for LoanResponse {
    fn from(loan: Loan) -> Self {
        Self {
            id: loan.id.map(|id| id.value()),
            isbn: loan.book.isbn.clone(),
            customer: loan.customer,
            customer_email: loan.customer_email,
            loan_date: loan.loan_date,
            returned: loan.returned.as_option(),
            book: BookResponse::from(loan.book),
        }
    }
}

/// 貸出作成レスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct LoanCreatedResponse {
    pub id: i64,
}

/// ページレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct PageResponse<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u64,
    pub page: u32,
    pub size: u32,
}

impl<T, U: From<T>> From<Page<T>> for PageResponse<U> {
    fn from(page: Page<T>) -> Self {
        let total_pages = page.total_pages();
        let page = page.map(U::from);
        Self {
            content: page.content,
            total_elements: page.total_elements,
            total_pages,
            page: page.page,
            size: page.size,
        }
    }
}

/// エラーレスポンス
///
/// 人が読めるメッセージのリストを返す。
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub errors: Vec<String>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            errors: vec![message.into()],
        }
    }

    pub fn from_messages(errors: Vec<String>) -> Self {
        Self { errors }
    }
}

/// バリデーションエラーをメッセージのリストに変換する
///
/// 順序を安定させるためにソートする。
pub fn validation_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(message) => message.to_string(),
                None => format!("{} is invalid", field),
            })
        })
        .collect();
    messages.sort();
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BookId;

    #[test]
    fn test_create_book_request_reports_every_empty_field() {
        let req = CreateBookRequest {
            title: String::new(),
            author: String::new(),
            isbn: "123".to_string(),
        };

        let errors = req.validate().unwrap_err();
        assert_eq!(
            validation_messages(&errors),
            vec!["author must not be empty", "title must not be empty"]
        );
    }

    #[test]
    fn test_create_loan_request_email_is_optional() {
        let req = CreateLoanRequest {
            isbn: "123".to_string(),
            customer: "Fulano".to_string(),
            customer_email: None,
        };
        assert!(req.validate().is_ok());

        let req = CreateLoanRequest {
            customer_email: Some("not-an-email".to_string()),
            ..req
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_page_query_defaults() {
        let request = PageQuery::default().to_page_request();
        assert_eq!(request, PageRequest::default());
    }

    #[test]
    fn test_page_response_from_page() {
        let book = Book {
            id: Some(BookId::new(7)),
            title: "Meu Livro".to_string(),
            author: "Moises".to_string(),
            isbn: "123".to_string(),
        };
        let page = Page::new(vec![book], PageRequest::new(0, 1), 3);

        let response: PageResponse<BookResponse> = page.into();
        assert_eq!(response.total_pages, 3);
        assert_eq!(response.content[0].id, Some(7));
    }
}
