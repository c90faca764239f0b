//! 延滞通知バッチのスケジューラ
//!
//! 1日1回、設定された時刻に延滞通知バッチを実行する。
//! 実行は常に直列で、前回の実行が終わってから次の待機を始める。
//! 停止中に過ぎた実行時刻は取り戻さず、次の時刻まで待つ。

use crate::application::{ServiceDependencies, loan::notify_late_loans};
use chrono::{Days, Local, NaiveDateTime, NaiveTime};
use tokio::task::JoinHandle;

/// 延滞通知バッチの実行設定
#[derive(Debug, Clone)]
pub struct OverdueScanSchedule {
    /// 実行時刻（ローカル時刻）
    pub run_at: NaiveTime,
    /// 延滞している顧客に送るメッセージ
    pub message: String,
}

/// 次回の実行日時を計算する
///
/// 今日の実行時刻がまだ来ていなければ今日、過ぎていれば明日の同時刻。
pub fn next_run_after(now: NaiveDateTime, run_at: NaiveTime) -> NaiveDateTime {
    let today = now.date().and_time(run_at);
    if today > now {
        return today;
    }

    now.date()
        .checked_add_days(Days::new(1))
        .map(|tomorrow| tomorrow.and_time(run_at))
        .unwrap_or(today)
}

/// 延滞通知バッチを1回実行する
///
/// 失敗はログに記録し、スケジューラは止めない。
pub async fn run_overdue_scan(deps: &ServiceDependencies, message: &str) {
    match notify_late_loans(deps, message).await {
        Ok(notified) => tracing::info!(notified, "overdue scan finished"),
        Err(e) => tracing::error!(error = ?e, "overdue scan failed"),
    }
}

/// スケジューラを起動する
///
/// 返されたハンドルをabortすると停止する。
pub fn spawn_overdue_scan(
    deps: ServiceDependencies,
    schedule: OverdueScanSchedule,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let now = Local::now().naive_local();
            let next = next_run_after(now, schedule.run_at);
            let wait = (next - now).to_std().unwrap_or_default();

            tracing::info!(next_run = %next, "overdue scan scheduled");
            tokio::time::sleep(wait).await;

            run_overdue_scan(&deps, &schedule.message).await;
        }
    })
}
