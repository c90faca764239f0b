pub mod mail_dispatcher;

pub use mail_dispatcher::MailDispatcher as SmtpMailDispatcher;
