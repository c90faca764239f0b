pub mod book;
mod dependencies;
pub mod loan;

pub use dependencies::ServiceDependencies;
