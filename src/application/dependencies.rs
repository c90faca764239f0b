use crate::ports::*;
use std::sync::Arc;

/// サービスの依存関係
///
/// 振る舞いは持たず、アプリケーション層の関数に依存関係を明示的に渡すためのデータ構造。
/// グローバルなサービスロケータは使わない。
#[derive(Clone)]
pub struct ServiceDependencies {
    pub book_repository: Arc<dyn BookRepository>,
    pub loan_repository: Arc<dyn LoanRepository>,
    pub mail_dispatcher: Arc<dyn MailDispatcher>,
}
