mod errors;
mod loan_service;
mod overdue_detection;

pub use errors::{LoanApplicationError, Result};
pub use loan_service::{
    find_late_loans, find_loans, get_all_late_loans, get_loan_by_id, get_loans_by_book,
    loan_book, return_loan, save_loan, update_loan,
};
pub use overdue_detection::{notify_late_loans, notify_late_loans_as_of};
