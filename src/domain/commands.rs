use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// コマンド：書籍を登録する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateBook {
    pub title: String,
    pub author: String,
    pub isbn: String,
}

/// コマンド：ISBNで指定した書籍を貸し出す
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanBook {
    pub isbn: String,
    pub customer: String,
    pub customer_email: Option<String>,
    pub loan_date: NaiveDate,
}
