// 🏷️ Transaction Categories
// Closed set of mobile-money event kinds the classifier can assign

use serde::{Deserialize, Serialize};
use std::fmt;

/// TransactionCategory - What kind of mobile-money event a message describes
///
/// `Unknown` is a sentinel for "no rule matched" and is never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionCategory {
    #[serde(rename = "Incoming Money")]
    IncomingMoney,
    #[serde(rename = "Internet Bundle")]
    InternetBundle,
    #[serde(rename = "Airtime Purchase")]
    AirtimePurchase,
    #[serde(rename = "Cash Power Payment")]
    CashPowerPayment,
    #[serde(rename = "Payment to Code Holder")]
    PaymentToCodeHolder,
    #[serde(rename = "Transfer to Mobile Number")]
    TransferToMobileNumber,
    #[serde(rename = "Bank Deposit")]
    BankDeposit,
    #[serde(rename = "Agent Withdrawal")]
    AgentWithdrawal,
    #[serde(rename = "Third Party Transaction")]
    ThirdPartyTransaction,
    Unknown,
}

impl TransactionCategory {
    /// Every persistable category, in rule evaluation order
    pub const ALL: [TransactionCategory; 9] = [
        TransactionCategory::IncomingMoney,
        TransactionCategory::InternetBundle,
        TransactionCategory::AirtimePurchase,
        TransactionCategory::CashPowerPayment,
        TransactionCategory::PaymentToCodeHolder,
        TransactionCategory::TransferToMobileNumber,
        TransactionCategory::BankDeposit,
        TransactionCategory::AgentWithdrawal,
        TransactionCategory::ThirdPartyTransaction,
    ];

    /// Label stored in the `transaction_type` column
    pub fn name(&self) -> &'static str {
        match self {
            TransactionCategory::IncomingMoney => "Incoming Money",
            TransactionCategory::InternetBundle => "Internet Bundle",
            TransactionCategory::AirtimePurchase => "Airtime Purchase",
            TransactionCategory::CashPowerPayment => "Cash Power Payment",
            TransactionCategory::PaymentToCodeHolder => "Payment to Code Holder",
            TransactionCategory::TransferToMobileNumber => "Transfer to Mobile Number",
            TransactionCategory::BankDeposit => "Bank Deposit",
            TransactionCategory::AgentWithdrawal => "Agent Withdrawal",
            TransactionCategory::ThirdPartyTransaction => "Third Party Transaction",
            TransactionCategory::Unknown => "Unknown",
        }
    }

    pub fn is_known(&self) -> bool {
        *self != TransactionCategory::Unknown
    }
}

impl fmt::Display for TransactionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
