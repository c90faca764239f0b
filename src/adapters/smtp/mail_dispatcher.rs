use crate::config::MailConfig;
use crate::ports::{MailDispatcher as MailDispatcherTrait, Result};
use async_trait::async_trait;
use lettre::{
    Message, SmtpTransport, Transport,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};

/// MailDispatcherのSMTP実装
///
/// 1通のメッセージを宛先全員に送る。送信は同期APIのため、
/// ブロッキング用スレッドプールで実行する。
#[derive(Clone)]
pub struct MailDispatcher {
    transport: SmtpTransport,
    from: Mailbox,
    subject: String,
}

impl MailDispatcher {
    /// 設定からSMTPトランスポートを構築する
    pub fn new(config: &MailConfig) -> Result<Self> {
        let builder = if config.smtp_use_tls {
            SmtpTransport::starttls_relay(&config.smtp_host)?
        } else {
            SmtpTransport::builder_dangerous(&config.smtp_host)
        }
        .port(config.smtp_port);

        let builder = match (&config.smtp_username, &config.smtp_password) {
            (Some(username), Some(password)) => {
                builder.credentials(Credentials::new(username.clone(), password.clone()))
            }
            _ => builder,
        };

        Ok(Self {
            transport: builder.build(),
            from: config.from.parse()?,
            subject: config.subject.clone(),
        })
    }

    /// 宛先全員を含む1通のメッセージを組み立てる
    fn build_message(&self, message: &str, recipients: &[String]) -> Result<Message> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(self.subject.clone())
            .header(ContentType::TEXT_PLAIN);

        for recipient in recipients {
            builder = builder.to(recipient.parse::<Mailbox>()?);
        }

        Ok(builder.body(message.to_string())?)
    }
}

#[async_trait]
impl MailDispatcherTrait for MailDispatcher {
    async fn send_mails(&self, message: &str, recipients: &[String]) -> Result<()> {
        let email = self.build_message(message, recipients)?;
        let transport = self.transport.clone();

        tokio::task::spawn_blocking(move || transport.send(&email))
            .await??;

        Ok(())
    }
}
