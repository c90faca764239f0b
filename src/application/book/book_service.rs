use crate::application::ServiceDependencies;
use crate::domain::{self, Book, BookFilter, BookId, Page, PageRequest, commands::CreateBook};
use crate::ports::WriteOutcome;

use super::errors::{BookApplicationError, Result};

/// 書籍を登録する
///
/// ビジネスルール：
/// - ISBNは書籍間で一意であること
///
/// 各フィールドは前後の空白を除いて保存する。
/// ISBNの存在確認を行ってから挿入する。挿入自体も一意制約で守られているため、
/// 同時に同じISBNが登録された場合も`DuplicateIsbn`になる。
///
/// # 戻り値
/// ID採番済みの書籍
pub async fn create_book(deps: &ServiceDependencies, cmd: CreateBook) -> Result<Book> {
    let book = Book::new(cmd.title.trim(), cmd.author.trim(), cmd.isbn.trim());

    // 1. ISBNの重複確認
    let exists = deps
        .book_repository
        .exists_by_isbn(&book.isbn)
        .await
        .map_err(BookApplicationError::RepositoryError)?;

    if exists {
        tracing::warn!(isbn = %book.isbn, "rejected book with duplicate isbn");
        return Err(BookApplicationError::DuplicateIsbn);
    }

    // 2. 保存
    match deps
        .book_repository
        .insert(&book)
        .await
        .map_err(BookApplicationError::RepositoryError)?
    {
        WriteOutcome::Written(saved) => Ok(saved),
        WriteOutcome::Conflict => Err(BookApplicationError::DuplicateIsbn),
    }
}

/// IDで書籍を取得する
///
/// 見つからない場合はエラーではなく`None`を返す。
pub async fn get_book_by_id(deps: &ServiceDependencies, id: BookId) -> Result<Option<Book>> {
    deps.book_repository
        .get_by_id(id)
        .await
        .map_err(BookApplicationError::RepositoryError)
}

/// ISBNで書籍を取得する
pub async fn get_book_by_isbn(deps: &ServiceDependencies, isbn: &str) -> Result<Option<Book>> {
    deps.book_repository
        .find_by_isbn(isbn)
        .await
        .map_err(BookApplicationError::RepositoryError)
}

/// 書籍を更新する
///
/// タイトルと著者のみ上書きされる。ISBNは変更されない。
///
/// # エラー
/// - InvalidArgument: IDが未採番
/// - BookNotFound: 該当する書籍が存在しない
pub async fn update_book(deps: &ServiceDependencies, book: Book) -> Result<Book> {
    let id = book.require_id()?;

    deps.book_repository
        .update(id, &book)
        .await
        .map_err(BookApplicationError::RepositoryError)?
        .ok_or(BookApplicationError::BookNotFound)
}

/// 書籍を削除する
///
/// # エラー
/// - InvalidArgument: IDが未採番
/// - BookNotFound: 該当する書籍が存在しない
/// - BookHasLoans: 貸出履歴から参照されている
pub async fn delete_book(deps: &ServiceDependencies, book: &Book) -> Result<()> {
    let id = book.require_id()?;

    match deps
        .book_repository
        .delete(id)
        .await
        .map_err(BookApplicationError::RepositoryError)?
    {
        WriteOutcome::Written(true) => Ok(()),
        WriteOutcome::Written(false) => Err(BookApplicationError::BookNotFound),
        WriteOutcome::Conflict => Err(BookApplicationError::BookHasLoans),
    }
}

/// 条件に一致する書籍をページ単位で検索する
///
/// 値が入っているフィールドのみ、大文字小文字を区別しない部分一致で比較する。
pub async fn find_books(
    deps: &ServiceDependencies,
    filter: &BookFilter,
    page: PageRequest,
) -> Result<Page<Book>> {
    deps.book_repository
        .find(filter, page)
        .await
        .map_err(BookApplicationError::RepositoryError)
}

/// 書籍のタイトルと著者を書き換えて更新する
///
/// APIの更新処理で使う、取得済みの書籍に対する簡易版。
pub async fn revise_book(
    deps: &ServiceDependencies,
    book: Book,
    title: String,
    author: String,
) -> Result<Book> {
    update_book(deps, domain::book::revise_book(book, title, author)).await
}
