use crate::domain::{Book, BookFilter, BookId, Page, PageRequest};
use async_trait::async_trait;

use super::{Result, WriteOutcome};

/// 書籍カタログストアポート
///
/// ISBNは書籍間で一意。挿入は一意制約に抵触した場合に`Conflict`を返す。
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// ISBNが登録済みか確認する
    async fn exists_by_isbn(&self, isbn: &str) -> Result<bool>;

    /// ISBNで書籍を取得する
    async fn find_by_isbn(&self, isbn: &str) -> Result<Option<Book>>;

    /// IDで書籍を取得する
    async fn get_by_id(&self, id: BookId) -> Result<Option<Book>>;

    /// 書籍を新規登録し、ID採番済みの書籍を返す
    ///
    /// 渡された書籍のidは無視される。
    async fn insert(&self, book: &Book) -> Result<WriteOutcome<Book>>;

    /// タイトルと著者を上書きする
    ///
    /// 該当行がない場合は`None`を返す。
    async fn update(&self, id: BookId, book: &Book) -> Result<Option<Book>>;

    /// 書籍を削除する
    ///
    /// 削除した場合は`Written(true)`、該当行がない場合は`Written(false)`、
    /// 貸出から参照されている場合は`Conflict`を返す。
    async fn delete(&self, id: BookId) -> Result<WriteOutcome<bool>>;

    /// 条件に一致する書籍をページ単位で検索する
    async fn find(&self, filter: &BookFilter, page: PageRequest) -> Result<Page<Book>>;
}
