// 🏷️ Classification Rules - Rules as Data
// Ordered phrase rules that map a message body to a transaction category

use crate::category::TransactionCategory;
use crate::extract;
use std::fmt;

// ============================================================================
// RULE DEFINITION
// ============================================================================

/// Which counterparty extractor a rule designates on match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counterparty {
    None,
    Sender,
    /// Two-word person name after "to"
    Recipient,
    /// Name after "via agent:"
    Agent,
    /// Business after "transaction of <amount> RWF by"
    Business,
}

/// Extracted counterparty, tagged with the record field it fills
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Party {
    Sender(String),
    Recipient(String),
}

impl Counterparty {
    /// Run the designated extractor against the body
    pub fn extract(&self, body: &str) -> Option<Party> {
        match self {
            Counterparty::None => None,
            Counterparty::Sender => extract::extract_sender(body).map(Party::Sender),
            Counterparty::Recipient => extract::extract_recipient(body).map(Party::Recipient),
            Counterparty::Agent => extract::extract_agent_name(body).map(Party::Recipient),
            Counterparty::Business => extract::extract_business_name(body).map(Party::Recipient),
        }
    }
}

#[derive(Clone)]
pub struct ClassificationRule {
    /// Rule ID for tracking
    pub id: &'static str,

    pub category: TransactionCategory,

    pub predicate: fn(&str) -> bool,

    pub counterparty: Counterparty,
}

impl fmt::Debug for ClassificationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassificationRule")
            .field("id", &self.id)
            .field("category", &self.category)
            .field("counterparty", &self.counterparty)
            .finish()
    }
}

impl ClassificationRule {
    pub fn matches(&self, body: &str) -> bool {
        (self.predicate)(body)
    }
}

fn contains_all(body: &str, phrases: &[&str]) -> bool {
    phrases.iter().all(|p| body.contains(p))
}

fn is_incoming_money(body: &str) -> bool {
    contains_all(body, &["You have received", "RWF", "on your mobile money account"])
}

// "igura" (Kinyarwanda bundle notice) always arrives alongside a
// "Bundles and Packs" message for the same amount, so it is not matched here.
fn is_internet_bundle(body: &str) -> bool {
    body.contains("Data Bundle") || contains_all(body, &["Bundles and Packs", "completed"])
}

fn is_airtime_purchase(body: &str) -> bool {
    contains_all(body, &["Your payment of", "to Airtime with token"])
}

fn is_cash_power_payment(body: &str) -> bool {
    contains_all(body, &["Your payment of", "to MTN Cash Power with token"])
}

fn is_payment_to_code_holder(body: &str) -> bool {
    contains_all(body, &["TxId:", "Your payment of", "has been completed"])
}

fn is_transfer_to_mobile_number(body: &str) -> bool {
    contains_all(body, &["RWF transferred to", "from 36521838"])
        || body.contains("You have transferred")
}

fn is_bank_deposit(body: &str) -> bool {
    contains_all(body, &["bank deposit", "has been added to your mobile money account"])
}

// Exports carry both "You ... have via agent:" and "*** has via agent:".
fn is_agent_withdrawal(body: &str) -> bool {
    (body.contains("have via agent:") || body.contains("has via agent:"))
        && contains_all(body, &["withdrawn", "RWF from your mobile money account"])
}

fn is_third_party_transaction(body: &str) -> bool {
    contains_all(
        body,
        &["transaction of", "on your MOMO account was successfully completed"],
    )
}

/// The rule table, in evaluation order. First match wins.
pub fn default_rules() -> Vec<ClassificationRule> {
    vec![
        ClassificationRule {
            id: "incoming_money",
            category: TransactionCategory::IncomingMoney,
            predicate: is_incoming_money,
            counterparty: Counterparty::Sender,
        },
        ClassificationRule {
            id: "internet_bundle",
            category: TransactionCategory::InternetBundle,
            predicate: is_internet_bundle,
            counterparty: Counterparty::None,
        },
        ClassificationRule {
            id: "airtime_purchase",
            category: TransactionCategory::AirtimePurchase,
            predicate: is_airtime_purchase,
            counterparty: Counterparty::None,
        },
        ClassificationRule {
            id: "cash_power_payment",
            category: TransactionCategory::CashPowerPayment,
            predicate: is_cash_power_payment,
            counterparty: Counterparty::None,
        },
        ClassificationRule {
            id: "payment_to_code_holder",
            category: TransactionCategory::PaymentToCodeHolder,
            predicate: is_payment_to_code_holder,
            counterparty: Counterparty::Recipient,
        },
        ClassificationRule {
            id: "transfer_to_mobile_number",
            category: TransactionCategory::TransferToMobileNumber,
            predicate: is_transfer_to_mobile_number,
            counterparty: Counterparty::Recipient,
        },
        ClassificationRule {
            id: "bank_deposit",
            category: TransactionCategory::BankDeposit,
            predicate: is_bank_deposit,
            counterparty: Counterparty::None,
        },
        ClassificationRule {
            id: "agent_withdrawal",
            category: TransactionCategory::AgentWithdrawal,
            predicate: is_agent_withdrawal,
            counterparty: Counterparty::Agent,
        },
        ClassificationRule {
            id: "third_party_transaction",
            category: TransactionCategory::ThirdPartyTransaction,
            predicate: is_third_party_transaction,
            counterparty: Counterparty::Business,
        },
    ]
}

// ============================================================================
// CLASSIFICATION RESULT
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    pub category: TransactionCategory,
    pub counterparty: Counterparty,
    pub rule_id: Option<&'static str>,
}

impl Default for ClassificationResult {
    fn default() -> Self {
        ClassificationResult {
            category: TransactionCategory::Unknown,
            counterparty: Counterparty::None,
            rule_id: None,
        }
    }
}

// ============================================================================
// RULE ENGINE
// ============================================================================

pub struct RuleEngine {
    rules: Vec<ClassificationRule>,
}

impl RuleEngine {
    /// Engine loaded with the mobile-money rule table
    pub fn new() -> Self {
        RuleEngine {
            rules: default_rules(),
        }
    }

    /// Create engine from a list of rules, evaluated in the given order
    pub fn from_rules(rules: Vec<ClassificationRule>) -> Self {
        RuleEngine { rules }
    }

    /// Apply rules top to bottom and stop at the first match
    pub fn classify(&self, body: &str) -> ClassificationResult {
        for rule in &self.rules {
            if rule.matches(body) {
                return ClassificationResult {
                    category: rule.category,
                    counterparty: rule.counterparty,
                    rule_id: Some(rule.id),
                };
            }
        }

        // No match found
        ClassificationResult::default()
    }

    pub fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }

    /// Get number of rules loaded
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
