pub mod book_repository;
pub mod loan_repository;
pub mod mail_dispatcher;

pub use book_repository::*;
pub use loan_repository::*;
pub use mail_dispatcher::*;

/// ポート共通のResult型
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 制約に抵触しうる書き込みの結果
///
/// 一意制約・外部キー制約に抵触した場合は`Conflict`を返し、
/// アプリケーション層でドメインのエラーに変換する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome<T> {
    Written(T),
    Conflict,
}
