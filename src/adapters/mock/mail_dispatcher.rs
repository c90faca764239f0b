use crate::ports::{MailDispatcher as MailDispatcherTrait, Result};
use async_trait::async_trait;
use std::sync::Mutex;

/// 送信されたメール1回分
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    pub message: String,
    pub recipients: Vec<String>,
}

/// MailDispatcherのモック実装
///
/// 実際には送信せず、送信内容を記録する。
/// 失敗を設定すると、以降の送信はすべてエラーになる。
pub struct MailDispatcher {
    sent: Mutex<Vec<SentMail>>,
    failure: Mutex<Option<String>>,
}

impl MailDispatcher {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failure: Mutex::new(None),
        }
    }

    /// テスト用に送信失敗を設定
    pub fn fail_with(&self, reason: impl Into<String>) {
        *self.failure.lock().unwrap() = Some(reason.into());
    }

    /// 記録された送信内容を取得
    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }
}

impl Default for MailDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MailDispatcherTrait for MailDispatcher {
    async fn send_mails(&self, message: &str, recipients: &[String]) -> Result<()> {
        if let Some(reason) = self.failure.lock().unwrap().clone() {
            return Err(reason.into());
        }

        self.sent.lock().unwrap().push(SentMail {
            message: message.to_string(),
            recipients: recipients.to_vec(),
        });
        Ok(())
    }
}
