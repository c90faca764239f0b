pub mod book;
pub mod commands;
pub mod errors;
pub mod loan;
pub mod value_objects;

pub use book::{Book, BookFilter};
pub use errors::*;
pub use loan::{Loan, LoanFilter};
pub use value_objects::*;
