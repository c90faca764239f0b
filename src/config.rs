//! 設定の読み込み
//!
//! 組み込みのデフォルト値、設定ファイル、環境変数の順に重ねる。

use chrono::NaiveTime;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

/// デフォルトの延滞通知メッセージ
pub const DEFAULT_LATE_LOANS_MESSAGE: &str =
    "Your book loan is overdue. Please return the book as soon as possible.";

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_use_tls: bool,
    /// 送信元アドレス
    pub from: String,
    pub subject: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SchedulerConfig {
    pub enabled: bool,
    /// 延滞通知バッチを実行する時刻（ローカル時刻）
    pub run_at: NaiveTime,
    pub late_loans_message: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub mail: MailConfig,
    pub scheduler: SchedulerConfig,
}

impl AppConfig {
    /// 設定ファイルと環境変数から設定を読み込む
    ///
    /// 環境変数は `LIBRARY__SECTION__KEY` の形式（例: `LIBRARY__SERVER__PORT`）。
    /// `DATABASE_URL` があれば `database.url` を上書きする。
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        Self::defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(
                Environment::with_prefix("LIBRARY")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("database.url", env::var("DATABASE_URL").ok())?
            .build()?
            .try_deserialize()
    }

    /// 組み込みのデフォルト値のみから設定を作る
    pub fn from_defaults() -> Result<Self, ConfigError> {
        Self::defaults()?.build()?.try_deserialize()
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("database.url", "postgres://localhost/library")?
            .set_default("database.max_connections", 5)?
            .set_default("mail.smtp_host", "localhost")?
            .set_default("mail.smtp_port", 587)?
            .set_default("mail.smtp_use_tls", true)?
            .set_default("mail.from", "library@localhost")?
            .set_default("mail.subject", "Overdue book loan")?
            .set_default("scheduler.enabled", true)?
            .set_default("scheduler.run_at", "00:00:00")?
            .set_default("scheduler.late_loans_message", DEFAULT_LATE_LOANS_MESSAGE)
    }
}
