use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{Book, IdentityError, LoanId, ReturnStatus, book::non_blank};

/// 延滞とみなすまでの日数
///
/// 貸出日が「今日 - 4日」以前で未返却の貸出は延滞扱い。
pub const LATE_LOAN_DAYS: u64 = 4;

/// 貸出 - 1冊の書籍の1回の貸出
///
/// 書籍は参照のみ保持し、書籍のライフサイクルは所有しない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub id: Option<LoanId>,
    pub book: Book,
    pub customer: String,
    pub customer_email: Option<String>,
    pub loan_date: NaiveDate,
    pub returned: ReturnStatus,
}

impl Loan {
    /// 貸出中か（返却フラグが未設定またはfalse）
    pub fn is_active(&self) -> bool {
        self.returned.is_open()
    }

    /// 採番済みのIDを取得する
    pub fn require_id(&self) -> Result<LoanId, IdentityError> {
        self.id.ok_or(IdentityError::LoanIdMissing)
    }
}

/// 純粋関数：書籍を貸し出す
///
/// 未保存の貸出を作成する。返却フラグは未設定（Unset）。
/// 顧客名とメールアドレスは前後の空白を除いて保持し、空のメールアドレスはNoneにする。
/// 「1冊につき貸出中は1件まで」の確認はアプリケーション層とストアが行う。
pub fn open_loan(
    book: Book,
    customer: String,
    customer_email: Option<String>,
    loan_date: NaiveDate,
) -> Loan {
    Loan {
        id: None,
        book,
        customer: customer.trim().to_string(),
        customer_email: non_blank(customer_email.as_deref()).map(str::to_string),
        loan_date,
        returned: ReturnStatus::Unset,
    }
}

/// 純粋関数：返却フラグを設定する
///
/// 返却済みへの変更は常に許可される。
pub fn mark_returned(loan: Loan, returned: bool) -> Loan {
    Loan {
        returned: returned.into(),
        ..loan
    }
}

/// 延滞判定の基準日
///
/// この日付以前に貸し出された未返却の貸出が延滞となる。
pub fn late_loan_cutoff(today: NaiveDate) -> NaiveDate {
    today
        .checked_sub_days(Days::new(LATE_LOAN_DAYS))
        .unwrap_or(NaiveDate::MIN)
}

/// 純粋関数：延滞判定
pub fn is_late(loan: &Loan, today: NaiveDate) -> bool {
    loan.is_active() && loan.loan_date <= late_loan_cutoff(today)
}

/// 貸出の検索条件
///
/// 書籍のISBNが一致する貸出と、顧客名が一致する貸出の和集合を返す（OR条件）。
/// 未指定のフィールドは条件に加えない。条件が1つもない場合は何も一致しない。
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LoanFilter {
    pub isbn: Option<String>,
    pub customer: Option<String>,
}

impl LoanFilter {
    pub fn isbn(&self) -> Option<&str> {
        non_blank(self.isbn.as_deref())
    }

    pub fn customer(&self) -> Option<&str> {
        non_blank(self.customer.as_deref())
    }

    pub fn is_empty(&self) -> bool {
        self.isbn().is_none() && self.customer().is_none()
    }

    /// メモリ上の貸出が条件を満たすか判定する
    pub fn matches(&self, loan: &Loan) -> bool {
        let by_isbn = self.isbn().is_some_and(|isbn| loan.book.isbn == isbn);
        let by_customer = self
            .customer()
            .is_some_and(|customer| loan.customer == customer);
        by_isbn || by_customer
    }
}
