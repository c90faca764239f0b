pub mod library_store;
pub mod mail_dispatcher;

pub use library_store::LibraryStore;
pub use mail_dispatcher::{MailDispatcher, SentMail};
