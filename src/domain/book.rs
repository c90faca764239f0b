use serde::{Deserialize, Serialize};

use super::{BookId, IdentityError};

/// 書籍 - カタログの1レコード
///
/// idはストアへの保存時に採番される。未保存の書籍はNoneを持つ。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: Option<BookId>,
    pub title: String,
    pub author: String,
    pub isbn: String,
}

impl Book {
    /// 未保存の書籍を作成する
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        isbn: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            title: title.into(),
            author: author.into(),
            isbn: isbn.into(),
        }
    }

    /// 採番済みのIDを取得する
    ///
    /// # エラー
    /// 未保存の書籍の場合は`IdentityError::BookIdMissing`を返す
    pub fn require_id(&self) -> Result<BookId, IdentityError> {
        self.id.ok_or(IdentityError::BookIdMissing)
    }
}

/// 純粋関数：書籍の内容を書き換える
///
/// ISBNは登録後に変更できないため、タイトルと著者のみ更新する。
pub fn revise_book(book: Book, title: String, author: String) -> Book {
    Book {
        title,
        author,
        ..book
    }
}

/// 書籍検索で比較するフィールド
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookField {
    Title,
    Author,
    Isbn,
}

impl BookField {
    pub fn column(&self) -> &'static str {
        match self {
            BookField::Title => "title",
            BookField::Author => "author",
            BookField::Isbn => "isbn",
        }
    }

    fn value_of<'a>(&self, book: &'a Book) -> &'a str {
        match self {
            BookField::Title => &book.title,
            BookField::Author => &book.author,
            BookField::Isbn => &book.isbn,
        }
    }
}

/// 検索条件の1句：フィールドが値を部分一致（大文字小文字を区別しない）で含む
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainsClause {
    pub field: BookField,
    pub value: String,
}

/// 書籍の検索条件（Filter-by-example）
///
/// 値が空のフィールドは無視され、指定されたフィールドはすべて満たす必要がある。
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BookFilter {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
}

impl BookFilter {
    /// 値が入っているフィールドだけを検索句に変換する
    pub fn clauses(&self) -> Vec<ContainsClause> {
        [
            (BookField::Title, &self.title),
            (BookField::Author, &self.author),
            (BookField::Isbn, &self.isbn),
        ]
        .into_iter()
        .filter_map(|(field, value)| {
            non_blank(value.as_deref()).map(|v| ContainsClause {
                field,
                value: v.to_string(),
            })
        })
        .collect()
    }

    /// メモリ上の書籍が条件を満たすか判定する
    pub fn matches(&self, book: &Book) -> bool {
        self.clauses().iter().all(|clause| {
            clause
                .field
                .value_of(book)
                .to_lowercase()
                .contains(&clause.value.to_lowercase())
        })
    }
}

/// 空白のみの文字列を未指定として扱う
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
