// ✅ Validation Gate
// Final accept/reject decision for a classified message

use crate::category::TransactionCategory;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    /// No category rule matched
    NoMatch,
    /// A category matched but amount, balance and transaction id are all absent
    WeakMatch,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::NoMatch => write!(f, "no category matched"),
            RejectReason::WeakMatch => write!(f, "no amount, balance or transaction id"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject(RejectReason),
}

impl Verdict {
    pub fn is_accept(&self) -> bool {
        matches!(self, Verdict::Accept)
    }
}

/// Accept iff the category is known and at least one informative field is present
pub fn validate(
    category: TransactionCategory,
    amount: Option<f64>,
    balance: Option<f64>,
    transaction_id: Option<&str>,
) -> Verdict {
    if !category.is_known() {
        return Verdict::Reject(RejectReason::NoMatch);
    }

    if amount.is_none() && balance.is_none() && transaction_id.is_none() {
        return Verdict::Reject(RejectReason::WeakMatch);
    }

    Verdict::Accept
}
