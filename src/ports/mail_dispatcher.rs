use async_trait::async_trait;

use super::Result;

/// メール送信ポート
///
/// 1通のメッセージを宛先リスト全員に送る。部分的な成功は扱わない。
/// 失敗した場合は全員に届かなかったものとして呼び出し元にエラーを返す。
#[async_trait]
pub trait MailDispatcher: Send + Sync {
    async fn send_mails(&self, message: &str, recipients: &[String]) -> Result<()>;
}
