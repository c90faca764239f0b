use crate::domain::book::ContainsClause;
use crate::domain::{Book, BookFilter, BookId, Page, PageRequest};
use crate::ports::{BookRepository as BookRepositoryTrait, Result, WriteOutcome};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder, Row, postgres::PgRow};

use super::{escape_like, is_foreign_key_violation};

/// PostgreSQLの行データをBookに変換する
fn map_row_to_book(row: &PgRow) -> Result<Book> {
    Ok(Book {
        id: Some(BookId::new(row.try_get("id")?)),
        title: row.try_get("title")?,
        author: row.try_get("author")?,
        isbn: row.try_get("isbn")?,
    })
}

/// 検索句をWHERE句として追加する
///
/// 値が入っているフィールドのみが句になっているため、ここでは空の判定をしない。
/// すべての句をANDで結合し、ILIKEで部分一致させる。
fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, clauses: &[ContainsClause]) {
    for (i, clause) in clauses.iter().enumerate() {
        builder.push(if i == 0 { " WHERE " } else { " AND " });
        builder
            .push(clause.field.column())
            .push(" ILIKE ")
            .push_bind(format!("%{}%", escape_like(&clause.value)));
    }
}

/// BookRepositoryのPostgreSQL実装
///
/// ISBNの一意制約はbooks.isbnのUNIQUE制約で保証する。
pub struct BookRepository {
    pool: PgPool,
}

impl BookRepository {
    /// PostgreSQLコネクションプールから新しいBookRepositoryを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookRepositoryTrait for BookRepository {
    async fn exists_by_isbn(&self, isbn: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM books WHERE isbn = $1)")
                .bind(isbn)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn find_by_isbn(&self, isbn: &str) -> Result<Option<Book>> {
        let row = sqlx::query("SELECT id, title, author, isbn FROM books WHERE isbn = $1")
            .bind(isbn)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_row_to_book).transpose()
    }

    async fn get_by_id(&self, id: BookId) -> Result<Option<Book>> {
        let row = sqlx::query("SELECT id, title, author, isbn FROM books WHERE id = $1")
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_row_to_book).transpose()
    }

    /// 書籍を挿入する
    ///
    /// ON CONFLICT DO NOTHINGにより、同じISBNが既にある場合は行が返らない。
    async fn insert(&self, book: &Book) -> Result<WriteOutcome<Book>> {
        let row = sqlx::query(
            r#"
            INSERT INTO books (title, author, isbn)
            VALUES ($1, $2, $3)
            ON CONFLICT (isbn) DO NOTHING
            RETURNING id, title, author, isbn
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(WriteOutcome::Written(map_row_to_book(&row)?)),
            None => Ok(WriteOutcome::Conflict),
        }
    }

    async fn update(&self, id: BookId, book: &Book) -> Result<Option<Book>> {
        let row = sqlx::query(
            r#"
            UPDATE books
            SET title = $2, author = $3
            WHERE id = $1
            RETURNING id, title, author, isbn
            "#,
        )
        .bind(id.value())
        .bind(&book.title)
        .bind(&book.author)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_book).transpose()
    }

    /// 書籍を削除する
    ///
    /// loans.book_idの外部キー（ON DELETE RESTRICT）に抵触した場合は`Conflict`。
    async fn delete(&self, id: BookId) -> Result<WriteOutcome<bool>> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id.value())
            .execute(&self.pool)
            .await;

        match result {
            Ok(done) => Ok(WriteOutcome::Written(done.rows_affected() > 0)),
            Err(e) if is_foreign_key_violation(&e) => Ok(WriteOutcome::Conflict),
            Err(e) => Err(e.into()),
        }
    }

    async fn find(&self, filter: &BookFilter, page: PageRequest) -> Result<Page<Book>> {
        let clauses = filter.clauses();

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM books");
        push_filter(&mut count, &clauses);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new("SELECT id, title, author, isbn FROM books");
        push_filter(&mut select, &clauses);
        select
            .push(" ORDER BY id LIMIT ")
            .push_bind(i64::from(page.size()))
            .push(" OFFSET ")
            .push_bind(page.offset() as i64);

        let rows = select.build().fetch_all(&self.pool).await?;
        let books = rows.iter().map(map_row_to_book).collect::<Result<Vec<_>>>()?;

        Ok(Page::new(books, page, total as u64))
    }
}
