use serde::{Deserialize, Serialize};

/// 書籍ID - ストアが採番する数値ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(i64);

impl BookId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// 貸出ID - ストアが採番する数値ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoanId(i64);

impl LoanId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// 返却状態
///
/// 永続化層ではNULL許容のbooleanとして保存される三値。
/// Unset と NotReturned はどちらも「貸出中」として扱う。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReturnStatus {
    /// 一度も明示されていない（NULL）
    #[default]
    Unset,
    /// 明示的に未返却（false）
    NotReturned,
    /// 返却済み（true）
    Returned,
}

impl ReturnStatus {
    /// 貸出中かどうか（Unset または NotReturned）
    pub fn is_open(&self) -> bool {
        !matches!(self, ReturnStatus::Returned)
    }

    pub fn as_option(&self) -> Option<bool> {
        match self {
            ReturnStatus::Unset => None,
            ReturnStatus::NotReturned => Some(false),
            ReturnStatus::Returned => Some(true),
        }
    }
}

impl From<Option<bool>> for ReturnStatus {
    fn from(value: Option<bool>) -> Self {
        match value {
            None => ReturnStatus::Unset,
            Some(false) => ReturnStatus::NotReturned,
            Some(true) => ReturnStatus::Returned,
        }
    }
}

impl From<bool> for ReturnStatus {
    fn from(returned: bool) -> Self {
        Some(returned).into()
    }
}

impl Serialize for ReturnStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_option().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ReturnStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<bool>::deserialize(deserializer).map(ReturnStatus::from)
    }
}

/// 1ページあたりの最大件数
pub const MAX_PAGE_SIZE: u32 = 100;

/// 1ページあたりのデフォルト件数
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// ページング要求
///
/// pageは0始まり。sizeは 1..=MAX_PAGE_SIZE に丸められる。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    size: u32,
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page,
            size: size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// 先頭から読み飛ばす件数
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(0, DEFAULT_PAGE_SIZE)
    }
}

/// ページング結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub page: u32,
    pub size: u32,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: PageRequest, total_elements: u64) -> Self {
        Self {
            content,
            total_elements,
            page: request.page(),
            size: request.size(),
        }
    }

    pub fn empty(request: PageRequest) -> Self {
        Self::new(Vec::new(), request, 0)
    }

    /// 全体のページ数
    pub fn total_pages(&self) -> u64 {
        self.total_elements.div_ceil(u64::from(self.size.max(1)))
    }

    /// 要素を変換した新しいページを返す
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            total_elements: self.total_elements,
            page: self.page,
            size: self.size,
        }
    }

    /// メモリ上の全件からページを切り出す
    pub fn slice(items: Vec<T>, request: PageRequest) -> Self {
        let total = items.len() as u64;
        let content = items
            .into_iter()
            .skip(request.offset() as usize)
            .take(request.size() as usize)
            .collect();
        Self::new(content, request, total)
    }
}
