use crate::application::ServiceDependencies;
use chrono::{Local, NaiveDate};
use std::collections::BTreeSet;

use super::errors::{LoanApplicationError, Result};
use super::loan_service::find_late_loans;

/// 延滞通知バッチ
///
/// 今日（ローカル日付）を基準に`notify_late_loans_as_of`を呼ぶ。
/// スケジューラから1日1回実行される。
pub async fn notify_late_loans(deps: &ServiceDependencies, message: &str) -> Result<usize> {
    notify_late_loans_as_of(deps, message, Local::now().date_naive()).await
}

/// 指定日を基準にした延滞通知バッチ
///
/// 処理フロー：
/// 1. 延滞中の貸出をすべて取得
/// 2. 各貸出から顧客のメールアドレスを取り出す（未登録の貸出はスキップ、重複は1件にまとめる）
/// 3. 取り出したアドレス全員に、1回の呼び出しでメッセージを送る
///
/// 再送は行わない。送信に失敗した場合は`TransportError`を返す。
///
/// # 戻り値
/// 通知したアドレスの件数（宛先がなく送信しなかった場合は0）
pub async fn notify_late_loans_as_of(
    deps: &ServiceDependencies,
    message: &str,
    today: NaiveDate,
) -> Result<usize> {
    let late_loans = find_late_loans(deps, today).await?;

    let emails: Vec<&str> = late_loans
        .iter()
        .filter_map(|loan| loan.customer_email.as_deref())
        .map(str::trim)
        .filter(|email| !email.is_empty())
        .collect();

    let skipped = late_loans.len() - emails.len();
    let recipients: Vec<String> = emails
        .into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect();

    if skipped > 0 {
        tracing::warn!(skipped, "late loans without customer email were skipped");
    }

    if recipients.is_empty() {
        tracing::info!(late_loans = late_loans.len(), "no late loan notices to send");
        return Ok(0);
    }

    deps.mail_dispatcher
        .send_mails(message, &recipients)
        .await
        .map_err(LoanApplicationError::TransportError)?;

    tracing::info!(recipients = recipients.len(), "late loan notices sent");
    Ok(recipients.len())
}
