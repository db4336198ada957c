// MoMo Ledger - Core Library
// Classifies mobile-money SMS messages into transaction records

pub mod category;
pub mod config;
pub mod db;
pub mod export;
pub mod extract;
pub mod invalid_log;
pub mod parser;
pub mod rules;
pub mod validation;

// Re-export commonly used types
pub use category::TransactionCategory;
pub use config::Config;
pub use db::{
    DateFilter, DuplicatePolicy, InsertStats, StoredTransaction, TypeSummary,
    setup_database, reset_database, insert_records,
    get_transactions, get_summary, verify_count,
};
pub use export::{read_export, parse_export};
pub use invalid_log::{format_invalid_log, write_invalid_log};
pub use parser::{
    BatchOutcome, MessageParser, Outcome, RawMessage, Rejection, TransactionRecord,
    parse_message,
};
pub use rules::{ClassificationResult, ClassificationRule, Counterparty, RuleEngine};
pub use validation::{RejectReason, Verdict, validate};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
