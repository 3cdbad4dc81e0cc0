use crate::domain::payment::{Payment, PaymentRecord, PaymentStatus};
use crate::domain::ports::PaymentRepository;
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};

/// Relational payment store backed by SQLite.
///
/// Payments map to rows of the `payments` table. Amounts are written as
/// their scale-2 decimal label into a TEXT column: TEXT affinity keeps the
/// exact string, so currency values survive the round-trip without ever
/// becoming a binary float. Every write runs in a transaction and the
/// committed row is re-read before it is returned, so callers always see
/// the store-assigned rowid and timestamps.
pub struct SqlitePaymentRepository {
    connection: Arc<Mutex<Connection>>,
}

impl SqlitePaymentRepository {
    /// Opens (or creates) the database file and ensures the schema exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let connection = Connection::open(path)?;
        let repository = Self {
            connection: Arc::new(Mutex::new(connection)),
        };
        repository.init()?;
        Ok(repository)
    }

    /// In-memory database, used by tests.
    pub fn open_in_memory() -> Result<Self> {
        let connection = Connection::open_in_memory()?;
        let repository = Self {
            connection: Arc::new(Mutex::new(connection)),
        };
        repository.init()?;
        Ok(repository)
    }

    fn init(&self) -> Result<()> {
        let connection = self.lock()?;
        connection.execute(
            "CREATE TABLE IF NOT EXISTS payments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                order_id INTEGER NOT NULL,
                amount TEXT NOT NULL,
                status TEXT NOT NULL,
                external_id TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;
        connection.execute(
            "CREATE INDEX IF NOT EXISTS idx_payments_order_id ON payments (order_id)",
            [],
        )?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.connection
            .lock()
            .map_err(|_| PaymentError::Storage("connection lock poisoned".to_string()))
    }
}

const SELECT_COLUMNS: &str =
    "SELECT id, order_id, amount, status, external_id, created_at, updated_at FROM payments";

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<PaymentRecord> {
    let amount_label: String = row.get(2)?;
    let status_label: String = row.get(3)?;
    let created_at_label: String = row.get(5)?;
    let updated_at_label: String = row.get(6)?;

    let amount = Decimal::from_str(&amount_label).map_err(|_| {
        rusqlite::Error::InvalidColumnType(2, "invalid decimal amount".to_string(), Type::Text)
    })?;
    let status = status_label.parse::<PaymentStatus>().map_err(|_| {
        rusqlite::Error::InvalidColumnType(3, "invalid payment status".to_string(), Type::Text)
    })?;
    let created_at = parse_timestamp(&created_at_label, 5)?;
    let updated_at = parse_timestamp(&updated_at_label, 6)?;

    Ok(PaymentRecord {
        id: row.get(0)?,
        order_id: row.get(1)?,
        amount,
        status,
        external_id: row.get(4)?,
        created_at,
        updated_at,
    })
}

fn parse_timestamp(label: &str, column: usize) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(label)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            rusqlite::Error::InvalidColumnType(column, "invalid timestamp".to_string(), Type::Text)
        })
}

fn query_by_id(connection: &Connection, payment_id: i64) -> Result<Option<PaymentRecord>> {
    let mut stmt = connection.prepare(&format!("{SELECT_COLUMNS} WHERE id = ?"))?;
    match stmt.query_row(params![payment_id], row_to_record) {
        Ok(record) => Ok(Some(record)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[async_trait]
impl PaymentRepository for SqlitePaymentRepository {
    async fn get_all(&self) -> Result<Vec<PaymentRecord>> {
        let connection = self.lock()?;
        let mut stmt = connection.prepare(SELECT_COLUMNS)?;
        let rows = stmt.query_map([], row_to_record)?;

        let mut payments = Vec::new();
        for row in rows {
            payments.push(row?);
        }
        Ok(payments)
    }

    async fn get_by_id(&self, payment_id: i64) -> Result<Option<PaymentRecord>> {
        let connection = self.lock()?;
        query_by_id(&connection, payment_id)
    }

    async fn get_by_order_id(&self, order_id: i64) -> Result<Option<PaymentRecord>> {
        let connection = self.lock()?;
        let mut stmt = connection.prepare(&format!("{SELECT_COLUMNS} WHERE order_id = ? LIMIT 1"))?;
        match stmt.query_row(params![order_id], row_to_record) {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn create(&self, payment: Payment) -> Result<PaymentRecord> {
        let mut connection = self.lock()?;
        let tx = connection.transaction()?;
        let now = Utc::now().to_rfc3339();
        tx.execute(
            "INSERT INTO payments (order_id, amount, status, external_id, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            params![
                payment.order_id,
                payment.amount.round_dp(2).to_string(),
                payment.status.to_string(),
                payment.external_id,
                now,
                now,
            ],
        )?;
        let payment_id = tx.last_insert_rowid();
        tx.commit()?;

        query_by_id(&connection, payment_id)?.ok_or_else(|| {
            PaymentError::Storage(format!("payment {payment_id} missing after insert"))
        })
    }

    async fn update_status(
        &self,
        payment_id: i64,
        status: PaymentStatus,
    ) -> Result<Option<PaymentRecord>> {
        let mut connection = self.lock()?;
        let tx = connection.transaction()?;
        if query_by_id(&tx, payment_id)?.is_none() {
            return Ok(None);
        }
        tx.execute(
            "UPDATE payments SET status = ?, updated_at = ? WHERE id = ?",
            params![status.to_string(), Utc::now().to_rfc3339(), payment_id],
        )?;
        tx.commit()?;

        query_by_id(&connection, payment_id)
    }

    async fn update_external_id(
        &self,
        payment_id: i64,
        external_id: &str,
    ) -> Result<Option<PaymentRecord>> {
        let mut connection = self.lock()?;
        let tx = connection.transaction()?;
        if query_by_id(&tx, payment_id)?.is_none() {
            return Ok(None);
        }
        tx.execute(
            "UPDATE payments SET external_id = ?, updated_at = ? WHERE id = ?",
            params![external_id, Utc::now().to_rfc3339(), payment_id],
        )?;
        tx.commit()?;

        query_by_id(&connection, payment_id)
    }
}
