use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Duration, NaiveDate, SecondsFormat, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::parser::TransactionRecord;

/// Format an instant the way it is stored in the `date` column
///
/// Millisecond precision with a `Z` suffix keeps string order equal to time order.
pub fn format_instant(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Compute idempotency hash for duplicate detection across re-imports
pub fn compute_idempotency_hash(record: &TransactionRecord) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!(
        "{}{}",
        format_instant(&record.timestamp),
        record.raw_message
    ));
    format!("{:x}", hasher.finalize())
}

/// Row as stored in the `transactions` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredTransaction {
    pub id: i64,
    pub transaction_type: String,
    pub date: String,
    pub amount: Option<f64>,
    pub recipient: Option<String>,
    pub sender: Option<String>,
    pub balance: Option<f64>,
    pub transaction_id: Option<String>,
    pub fee: Option<f64>,
    pub raw_message: String,
}

/// One line of the per-type summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeSummary {
    pub transaction_type: String,
    pub count: i64,
    pub total: Option<f64>,
}

/// What to do with a record whose hash is already stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Store every record; identical messages in one export are all kept
    Keep,
    /// Skip records already present before this insert (re-import of an export)
    Skip,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertStats {
    pub inserted: usize,
    pub duplicates: usize,
}

// ============================================================================
// SCHEMA
// ============================================================================

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS transactions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            idempotency_hash TEXT NOT NULL,
            transaction_type TEXT NOT NULL,
            date TEXT NOT NULL,
            amount REAL,
            recipient TEXT,
            sender TEXT,
            balance REAL,
            transaction_id TEXT,
            fee REAL,
            raw_message TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_idempotency_hash ON transactions(idempotency_hash)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_date ON transactions(date)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_type ON transactions(transaction_type)",
        [],
    )?;

    Ok(())
}

/// Drop and recreate the schema so an import starts from an empty table
pub fn reset_database(conn: &Connection) -> Result<()> {
    conn.execute("DROP TABLE IF EXISTS transactions", [])?;
    setup_database(conn)?;
    info!("transactions table recreated");
    Ok(())
}

// ============================================================================
// WRITES
// ============================================================================

/// Insert accepted records in a single SQL transaction
///
/// With `DuplicatePolicy::Skip`, a record is skipped only when its hash was
/// stored before this call, so repeated messages within `records` all land.
pub fn insert_records(
    conn: &mut Connection,
    records: &[TransactionRecord],
    policy: DuplicatePolicy,
) -> Result<InsertStats> {
    let tx = conn.transaction()?;
    let mut stats = InsertStats::default();

    {
        let mut exists = tx.prepare(
            "SELECT EXISTS(SELECT 1 FROM transactions WHERE idempotency_hash = ?1)",
        )?;
        let mut stmt = tx.prepare(
            "INSERT INTO transactions (
                idempotency_hash, transaction_type, date, amount, recipient,
                sender, balance, transaction_id, fee, raw_message
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )?;

        // Hashes are checked up front so in-batch repeats are not mistaken for stored rows
        let mut pending = Vec::with_capacity(records.len());
        for record in records {
            if !record.category.is_known() {
                return Err(anyhow!(
                    "Refusing to store a record without a category: {}",
                    record.raw_message
                ));
            }

            let hash = compute_idempotency_hash(record);
            let stored = match policy {
                DuplicatePolicy::Keep => false,
                DuplicatePolicy::Skip => {
                    exists.query_row(params![hash], |row| row.get::<_, bool>(0))?
                }
            };
            pending.push((record, hash, stored));
        }

        for (record, hash, stored) in pending {
            if stored {
                debug!(hash = %hash, "skipping duplicate record");
                stats.duplicates += 1;
                continue;
            }

            stmt.execute(params![
                hash,
                record.category.name(),
                format_instant(&record.timestamp),
                record.amount,
                record.recipient,
                record.sender,
                record.balance,
                record.transaction_id,
                record.fee,
                record.raw_message,
            ])
            .context("Failed to insert transaction")?;
            stats.inserted += 1;
        }
    }

    tx.commit().context("Failed to commit transactions")?;

    info!(
        inserted = stats.inserted,
        duplicates = stats.duplicates,
        "stored transactions"
    );
    Ok(stats)
}

// ============================================================================
// READS
// ============================================================================

/// Inclusive date window for queries
///
/// `to` is stored already extended by one day so the whole final day is included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateFilter {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl DateFilter {
    /// Build a filter from `YYYY-MM-DD` or RFC 3339 strings; empty strings are ignored
    pub fn parse(from: Option<&str>, to: Option<&str>) -> Result<Self> {
        let from = match from.map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) => Some(parse_bound(s).with_context(|| format!("Invalid 'from' date: {}", s))?),
            None => None,
        };
        let to = match to.map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) => Some(
                parse_bound(s).with_context(|| format!("Invalid 'to' date: {}", s))? + Duration::days(1),
            ),
            None => None,
        };

        Ok(DateFilter { from, to })
    }

    fn where_clause(&self) -> (String, Vec<String>) {
        let mut clause = String::new();
        let mut params = Vec::new();

        if self.from.is_some() || self.to.is_some() {
            clause.push_str(" WHERE 1=1");
            if let Some(from) = &self.from {
                clause.push_str(" AND date >= ?");
                params.push(format_instant(from));
            }
            if let Some(to) = &self.to {
                clause.push_str(" AND date <= ?");
                params.push(format_instant(to));
            }
        }

        (clause, params)
    }
}

fn parse_bound(value: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")?;
    date.and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
        .ok_or_else(|| anyhow!("Invalid date: {}", value))
}

/// All stored transactions in the window, newest first
pub fn get_transactions(conn: &Connection, filter: &DateFilter) -> Result<Vec<StoredTransaction>> {
    let (clause, args) = filter.where_clause();
    let sql = format!(
        "SELECT id, transaction_type, date, amount, recipient, sender,
                balance, transaction_id, fee, raw_message
         FROM transactions{}
         ORDER BY date DESC",
        clause
    );

    let mut stmt = conn.prepare(&sql)?;
    let transactions = stmt
        .query_map(rusqlite::params_from_iter(args.iter()), |row| {
            Ok(StoredTransaction {
                id: row.get(0)?,
                transaction_type: row.get(1)?,
                date: row.get(2)?,
                amount: row.get(3)?,
                recipient: row.get(4)?,
                sender: row.get(5)?,
                balance: row.get(6)?,
                transaction_id: row.get(7)?,
                fee: row.get(8)?,
                raw_message: row.get(9)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(transactions)
}

/// Count and total amount per transaction type in the window
pub fn get_summary(conn: &Connection, filter: &DateFilter) -> Result<Vec<TypeSummary>> {
    let (clause, args) = filter.where_clause();
    let sql = format!(
        "SELECT transaction_type, COUNT(*) as count, SUM(amount) as total
         FROM transactions{}
         GROUP BY transaction_type
         ORDER BY transaction_type",
        clause
    );

    let mut stmt = conn.prepare(&sql)?;
    let summary = stmt
        .query_map(rusqlite::params_from_iter(args.iter()), |row| {
            Ok(TypeSummary {
                transaction_type: row.get(0)?,
                count: row.get(1)?,
                total: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(summary)
}

pub fn verify_count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?;

    Ok(count)
}
