// 🏗️ Message Parser
// Turns one raw mobile-money message into an accepted record or a rejection

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::category::TransactionCategory;
use crate::extract;
use crate::rules::{Party, RuleEngine};
use crate::validation::{self, RejectReason, Verdict};

// ============================================================================
// CORE TYPES
// ============================================================================

/// RawMessage - One decoded message from the export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMessage {
    pub timestamp: DateTime<Utc>,
    pub body: String,
}

impl RawMessage {
    pub fn new(timestamp: DateTime<Utc>, body: impl Into<String>) -> Self {
        RawMessage {
            timestamp,
            body: body.into(),
        }
    }
}

/// TransactionRecord - Output of the parser, ready for storage
///
/// `recipient` and `sender` are never both populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub category: TransactionCategory,
    pub amount: Option<f64>,
    pub balance: Option<f64>,
    pub transaction_id: Option<String>,
    pub fee: Option<f64>,
    pub recipient: Option<String>,
    pub sender: Option<String>,
    pub raw_message: String,
    pub timestamp: DateTime<Utc>,
}

impl TransactionRecord {
    /// Create a record with only the required fields
    pub fn new(category: TransactionCategory, raw_message: String, timestamp: DateTime<Utc>) -> Self {
        TransactionRecord {
            category,
            amount: None,
            balance: None,
            transaction_id: None,
            fee: None,
            recipient: None,
            sender: None,
            raw_message,
            timestamp,
        }
    }

    /// Builder pattern: fill in the counterparty field it belongs to
    pub fn with_party(mut self, party: Option<Party>) -> Self {
        match party {
            Some(Party::Sender(name)) => self.sender = Some(name),
            Some(Party::Recipient(name)) => self.recipient = Some(name),
            None => {}
        }
        self
    }
}

/// Rejection - A message that will not be persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rejection {
    pub timestamp: DateTime<Utc>,
    pub body: String,
    pub reason: RejectReason,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Accepted(TransactionRecord),
    Rejected(Rejection),
}

impl Outcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Outcome::Accepted(_))
    }
}

/// Results of a batch, each list in input order
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub accepted: Vec<TransactionRecord>,
    pub rejected: Vec<Rejection>,
}

impl BatchOutcome {
    pub fn total(&self) -> usize {
        self.accepted.len() + self.rejected.len()
    }
}

// ============================================================================
// PARSER
// ============================================================================

/// Category-independent fields, computed once per message
#[derive(Debug, Clone, PartialEq)]
struct CommonFields {
    amount: Option<f64>,
    balance: Option<f64>,
    transaction_id: Option<String>,
    fee: Option<f64>,
}

impl CommonFields {
    fn extract(body: &str) -> Self {
        CommonFields {
            amount: extract::extract_amount(body),
            balance: extract::extract_balance(body),
            transaction_id: extract::extract_transaction_id(body),
            fee: extract::extract_fee(body),
        }
    }
}

pub struct MessageParser {
    engine: RuleEngine,
}

impl MessageParser {
    pub fn new() -> Self {
        MessageParser {
            engine: RuleEngine::new(),
        }
    }

    pub fn with_engine(engine: RuleEngine) -> Self {
        MessageParser { engine }
    }

    /// Extract, classify and validate a single message. Never fails.
    pub fn parse(&self, message: &RawMessage) -> Outcome {
        let body = message.body.as_str();
        let fields = CommonFields::extract(body);
        let classification = self.engine.classify(body);

        let verdict = validation::validate(
            classification.category,
            fields.amount,
            fields.balance,
            fields.transaction_id.as_deref(),
        );

        debug!(
            category = %classification.category,
            rule = classification.rule_id.unwrap_or("-"),
            accepted = verdict.is_accept(),
            "classified message"
        );

        match verdict {
            Verdict::Accept => {
                let party = classification.counterparty.extract(body);
                let mut record =
                    TransactionRecord::new(classification.category, message.body.clone(), message.timestamp)
                        .with_party(party);
                record.amount = fields.amount;
                record.balance = fields.balance;
                record.transaction_id = fields.transaction_id;
                record.fee = fields.fee;
                Outcome::Accepted(record)
            }
            Verdict::Reject(reason) => Outcome::Rejected(Rejection {
                timestamp: message.timestamp,
                body: message.body.clone(),
                reason,
            }),
        }
    }

    /// Parse every message, keeping each result tied to its source message
    pub fn parse_batch(&self, messages: &[RawMessage]) -> BatchOutcome {
        let mut batch = BatchOutcome::default();

        for message in messages {
            match self.parse(message) {
                Outcome::Accepted(record) => batch.accepted.push(record),
                Outcome::Rejected(rejection) => batch.rejected.push(rejection),
            }
        }

        batch
    }
}

impl Default for MessageParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse one message with the default rule table
pub fn parse_message(message: &RawMessage) -> Outcome {
    MessageParser::new().parse(message)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn message(body: &str) -> RawMessage {
        RawMessage::new(Utc.timestamp_millis_opt(1715351458724).unwrap(), body)
    }

    fn accepted(body: &str) -> TransactionRecord {
        match parse_message(&message(body)) {
            Outcome::Accepted(record) => record,
            Outcome::Rejected(r) => panic!("expected accepted record, got {:?}", r.reason),
        }
    }

    fn rejected(body: &str) -> Rejection {
        match parse_message(&message(body)) {
            Outcome::Rejected(rejection) => rejection,
            Outcome::Accepted(record) => panic!("expected rejection, got {}", record.category),
        }
    }

    #[test]
    fn test_incoming_money_end_to_end() {
        let record = accepted(
            "You have received 2,000 RWF from Jane Doe (*************) on your mobile money account at 2024-05-10 16:30:51. Your new balance:3,000 RWF",
        );

        assert_eq!(record.category, TransactionCategory::IncomingMoney);
        assert_eq!(record.amount, Some(2000.0));
        assert_eq!(record.balance, Some(3000.0));
        assert_eq!(record.sender, Some("Jane Doe".to_string()));
        assert_eq!(record.recipient, None);
    }

    #[test]
    fn test_agent_withdrawal_end_to_end() {
        let record = accepted(
            "*** has via agent: John Agent (250788000000) withdrawn 5,000 RWF from your mobile money account: 36521838 at 2024-05-26 02:10:27",
        );

        assert_eq!(record.category, TransactionCategory::AgentWithdrawal);
        assert_eq!(record.amount, Some(5000.0));
        assert_eq!(record.recipient, Some("John Agent".to_string()));
        assert_eq!(record.sender, None);
    }

    #[test]
    fn test_agent_withdrawal_have_phrasing_end_to_end() {
        let record = accepted(
            "You Abebe Chala CHEBUDIE (*********036) have via agent: Agent Sophia (250790777777), withdrawn 20,000 RWF from your mobile money account: 36521838 at 2024-05-26 02:10:27 and you can now collect your money in cash. Your new balance: 6,400 RWF. Fee paid: 350 RWF. Financial Transaction Id: 14098463509.",
        );

        assert_eq!(record.category, TransactionCategory::AgentWithdrawal);
        assert_eq!(record.amount, Some(20000.0));
        assert_eq!(record.balance, Some(6400.0));
        assert_eq!(record.transaction_id, Some("14098463509".to_string()));
        assert_eq!(record.recipient, Some("Agent Sophia".to_string()));
    }

    #[test]
    fn test_data_bundle_has_no_counterparty() {
        let record = accepted(
            "*162*TxId:13913173274*S*Your payment of 2000 RWF to Data Bundle MTN with token  has been completed at 2024-05-12 11:41:28. Fee was 0 RWF. Your new balance: 25280 RWF .",
        );

        assert_eq!(record.category, TransactionCategory::InternetBundle);
        assert_eq!(record.transaction_id, Some("13913173274".to_string()));
        assert_eq!(record.amount, Some(2000.0));
        assert_eq!(record.fee, Some(0.0));
        assert_eq!(record.recipient, None);
        assert_eq!(record.sender, None);
    }

    #[test]
    fn test_code_holder_single_name_keeps_category() {
        let record = accepted(
            "TxId: 51732411227. Your payment of 600 RWF to Bakery 95464 has been completed at 2024-05-10",
        );

        assert_eq!(record.category, TransactionCategory::PaymentToCodeHolder);
        assert_eq!(record.recipient, None);
    }

    #[test]
    fn test_weak_match_is_rejected() {
        let rejection = rejected("Your Data Bundle is about to expire.");
        assert_eq!(rejection.reason, RejectReason::WeakMatch);
    }

    #[test]
    fn test_promotional_message_is_rejected_with_source() {
        let body = "Y'ello! Get double data this weekend. Dial *345# to enjoy.";
        let rejection = rejected(body);

        assert_eq!(rejection.reason, RejectReason::NoMatch);
        assert_eq!(rejection.body, body);
        assert_eq!(rejection.timestamp.timestamp_millis(), 1715351458724);
    }

    #[test]
    fn test_batch_preserves_message_identity() {
        let base = Utc.timestamp_millis_opt(1715351458724).unwrap();
        let messages = vec![
            RawMessage::new(base, "Promo: nothing to see"),
            RawMessage::new(
                base + chrono::Duration::seconds(60),
                "*113*R*A bank deposit of 40,000 RWF has been added to your mobile money account at 2024-05-11. Your NEW BALANCE :40,400 RWF.",
            ),
            RawMessage::new(base + chrono::Duration::seconds(120), "Another promo"),
        ];

        let batch = MessageParser::new().parse_batch(&messages);

        assert_eq!(batch.total(), 3);
        assert_eq!(batch.accepted.len(), 1);
        assert_eq!(batch.rejected.len(), 2);

        let deposit = &batch.accepted[0];
        assert_eq!(deposit.category, TransactionCategory::BankDeposit);
        assert_eq!(deposit.timestamp, messages[1].timestamp);
        assert_eq!(deposit.raw_message, messages[1].body);
        assert_eq!(deposit.balance, Some(40400.0));

        assert_eq!(batch.rejected[0].body, "Promo: nothing to see");
        assert_eq!(batch.rejected[1].timestamp, messages[2].timestamp);
    }

    #[test]
    fn test_accepted_records_never_have_both_parties() {
        let bodies = [
            "You have received 2,000 RWF from Jane Doe (*****) on your mobile money account. Your new balance:3,000 RWF",
            "You have transferred 3,000 RWF to Linda Green (250790000000) from 36521838. New balance: 1,000 RWF",
            "A transaction of 3,500 RWF by DIRECT PAYMENT LTD on your MOMO account was successfully completed",
        ];

        for body in bodies {
            let record = accepted(body);
            assert!(record.sender.is_none() || record.recipient.is_none());
        }
    }
}
