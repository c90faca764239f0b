use crate::domain::{Book, BookId, Loan, LoanId, Page, PageRequest, ReturnStatus};
use crate::ports::{LoanRepository as LoanRepositoryTrait, Result, WriteOutcome};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Row, postgres::PgRow};

use super::is_unique_violation;

/// 貸出と書籍を結合して取得するSELECT句
const SELECT_LOANS: &str = r#"
    SELECT
        l.id,
        l.customer,
        l.customer_email,
        l.loan_date,
        l.returned,
        b.id AS book_id,
        b.title,
        b.author,
        b.isbn
    FROM loans l
    JOIN books b ON b.id = l.book_id
"#;

/// PostgreSQLの行データをLoanに変換する
///
/// returnedはNULL許容のbooleanで、ReturnStatusの三値に変換する。
fn map_row_to_loan(row: &PgRow) -> Result<Loan> {
    let returned: Option<bool> = row.try_get("returned")?;

    Ok(Loan {
        id: Some(LoanId::new(row.try_get("id")?)),
        book: Book {
            id: Some(BookId::new(row.try_get("book_id")?)),
            title: row.try_get("title")?,
            author: row.try_get("author")?,
            isbn: row.try_get("isbn")?,
        },
        customer: row.try_get("customer")?,
        customer_email: row.try_get("customer_email")?,
        loan_date: row.try_get("loan_date")?,
        returned: ReturnStatus::from(returned),
    })
}

fn map_rows(rows: &[PgRow]) -> Result<Vec<Loan>> {
    rows.iter().map(map_row_to_loan).collect()
}

/// LoanRepositoryのPostgreSQL実装
///
/// 「1冊につき貸出中は1件まで」は部分一意インデックス
/// `loans(book_id) WHERE returned IS NOT TRUE` で保証する。
pub struct LoanRepository {
    pool: PgPool,
}

impl LoanRepository {
    /// PostgreSQLコネクションプールから新しいLoanRepositoryを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_by_id(&self, id: LoanId) -> Result<Option<Loan>> {
        let row = sqlx::query(&format!("{SELECT_LOANS} WHERE l.id = $1"))
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_row_to_loan).transpose()
    }
}

#[async_trait]
impl LoanRepositoryTrait for LoanRepository {
    async fn exists_active_loan_for_book(&self, book_id: BookId) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM loans
                WHERE book_id = $1 AND returned IS NOT TRUE
            )
            "#,
        )
        .bind(book_id.value())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn get_by_id(&self, id: LoanId) -> Result<Option<Loan>> {
        self.fetch_by_id(id).await
    }

    /// 条件付きで貸出を挿入する
    ///
    /// 部分一意インデックスを調停に使うON CONFLICT DO NOTHINGにより、
    /// 同じ書籍に貸出中の貸出がある場合は1文で挿入を取りやめる。
    async fn insert(&self, loan: &Loan) -> Result<WriteOutcome<Loan>> {
        let book_id = loan.book.require_id().map_err(|e| e.message())?;

        let inserted: Option<i64> = sqlx::query_scalar(
            r#"
            INSERT INTO loans (book_id, customer, customer_email, loan_date, returned)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (book_id) WHERE returned IS NOT TRUE DO NOTHING
            RETURNING id
            "#,
        )
        .bind(book_id.value())
        .bind(&loan.customer)
        .bind(&loan.customer_email)
        .bind(loan.loan_date)
        .bind(loan.returned.as_option())
        .fetch_optional(&self.pool)
        .await?;

        let Some(id) = inserted else {
            return Ok(WriteOutcome::Conflict);
        };

        let saved = self
            .fetch_by_id(LoanId::new(id))
            .await?
            .ok_or("inserted loan could not be read back")?;
        Ok(WriteOutcome::Written(saved))
    }

    /// 貸出を上書きする
    ///
    /// 貸出中に戻した結果、部分一意インデックスに抵触した場合は`Conflict`。
    async fn update(&self, id: LoanId, loan: &Loan) -> Result<Option<WriteOutcome<Loan>>> {
        let result = sqlx::query(
            r#"
            UPDATE loans
            SET customer = $2, customer_email = $3, loan_date = $4, returned = $5
            WHERE id = $1
            "#,
        )
        .bind(id.value())
        .bind(&loan.customer)
        .bind(&loan.customer_email)
        .bind(loan.loan_date)
        .bind(loan.returned.as_option())
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) if done.rows_affected() == 0 => Ok(None),
            Ok(_) => Ok(self.fetch_by_id(id).await?.map(WriteOutcome::Written)),
            Err(e) if is_unique_violation(&e) => Ok(Some(WriteOutcome::Conflict)),
            Err(e) => Err(e.into()),
        }
    }

    /// ISBNまたは顧客名が一致する貸出を検索する
    ///
    /// NULLを束縛した側の条件は `= NULL` となり一致しない。
    async fn find_by_isbn_or_customer(
        &self,
        isbn: Option<&str>,
        customer: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<Loan>> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM loans l
            JOIN books b ON b.id = l.book_id
            WHERE b.isbn = $1 OR l.customer = $2
            "#,
        )
        .bind(isbn)
        .bind(customer)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query(&format!(
            "{SELECT_LOANS} WHERE b.isbn = $1 OR l.customer = $2 ORDER BY l.id LIMIT $3 OFFSET $4"
        ))
        .bind(isbn)
        .bind(customer)
        .bind(i64::from(page.size()))
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(map_rows(&rows)?, page, total as u64))
    }

    async fn find_by_book(&self, book_id: BookId, page: PageRequest) -> Result<Page<Loan>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM loans WHERE book_id = $1")
            .bind(book_id.value())
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query(&format!(
            "{SELECT_LOANS} WHERE l.book_id = $1 ORDER BY l.id LIMIT $2 OFFSET $3"
        ))
        .bind(book_id.value())
        .bind(i64::from(page.size()))
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(map_rows(&rows)?, page, total as u64))
    }

    /// 延滞候補を検索（延滞通知バッチ用）
    ///
    /// (loan_date) WHERE returned IS NOT TRUE の部分インデックスを使用する。
    async fn find_overdue_unreturned(&self, cutoff: NaiveDate) -> Result<Vec<Loan>> {
        let rows = sqlx::query(&format!(
            "{SELECT_LOANS} WHERE l.loan_date <= $1 AND l.returned IS NOT TRUE ORDER BY l.id"
        ))
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        map_rows(&rows)
    }
}
