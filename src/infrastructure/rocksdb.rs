use crate::domain::payment::{Payment, PaymentRecord, PaymentStatus};
use crate::domain::ports::PaymentRepository;
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rocksdb::{ColumnFamilyDescriptor, DB, IteratorMode, Options};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

/// Column Family holding one JSON document per payment.
pub const CF_PAYMENTS: &str = "payments";

/// On-disk document shape.
///
/// RocksDB assigns no identity of its own, so `id` lives inside the
/// document and doubles as the big-endian key. The amount is held as a
/// float in the document and rebuilt into an exact decimal on read via its
/// string form; that conversion path is what keeps `25.98` from coming
/// back as `25.979999...`.
#[derive(Debug, Serialize, Deserialize)]
struct PaymentDocument {
    id: i64,
    order_id: i64,
    amount: f64,
    status: PaymentStatus,
    external_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PaymentDocument {
    fn into_record(self) -> Result<PaymentRecord> {
        let amount = Decimal::from_str(&self.amount.to_string())
            .map_err(|e| PaymentError::InvalidAmount(format!("{}: {e}", self.amount)))?;
        Ok(PaymentRecord {
            id: self.id,
            order_id: self.order_id,
            amount,
            status: self.status,
            external_id: self.external_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Document-store payment repository backed by RocksDB.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBPaymentRepository {
    db: Arc<DB>,
}

impl RocksDBPaymentRepository {
    /// Opens or creates a RocksDB instance at the specified path, ensuring
    /// the payments column family exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_payments = ColumnFamilyDescriptor::new(CF_PAYMENTS, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_payments])?;

        Ok(Self { db: Arc::new(db) })
    }

    fn cf(&self) -> Result<&rocksdb::ColumnFamily> {
        self.db
            .cf_handle(CF_PAYMENTS)
            .ok_or_else(|| PaymentError::Storage("payments column family not found".to_string()))
    }

    /// Largest stored id plus one, or 1 for an empty store.
    ///
    /// Keys are big-endian, so the last key in iteration order is the
    /// maximum. Not atomic: two concurrent creates can read the same
    /// maximum and collide on the next id. Deployments that create
    /// payments concurrently should use the relational backend, which
    /// leaves identity to the store.
    fn next_payment_id(&self) -> Result<i64> {
        let cf = self.cf()?;
        let mut iter = self.db.iterator_cf(&cf, IteratorMode::End);
        match iter.next() {
            Some(item) => {
                let (key, _value) = item?;
                let bytes: [u8; 8] = key.as_ref().try_into().map_err(|_| {
                    PaymentError::Storage("malformed payment key".to_string())
                })?;
                Ok(i64::from_be_bytes(bytes) + 1)
            }
            None => Ok(1),
        }
    }

    fn get_document(&self, payment_id: i64) -> Result<Option<PaymentDocument>> {
        let cf = self.cf()?;
        match self.db.get_cf(&cf, payment_id.to_be_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn put_document(&self, document: &PaymentDocument) -> Result<()> {
        let cf = self.cf()?;
        self.db
            .put_cf(&cf, document.id.to_be_bytes(), serde_json::to_vec(document)?)?;
        Ok(())
    }
}

#[async_trait]
impl PaymentRepository for RocksDBPaymentRepository {
    async fn get_all(&self) -> Result<Vec<PaymentRecord>> {
        let cf = self.cf()?;
        let iter = self.db.iterator_cf(&cf, IteratorMode::Start);

        let mut payments = Vec::new();
        for item in iter {
            let (_key, value) = item?;
            let document: PaymentDocument = serde_json::from_slice(&value)?;
            payments.push(document.into_record()?);
        }
        Ok(payments)
    }

    async fn get_by_id(&self, payment_id: i64) -> Result<Option<PaymentRecord>> {
        match self.get_document(payment_id)? {
            Some(document) => Ok(Some(document.into_record()?)),
            None => Ok(None),
        }
    }

    async fn get_by_order_id(&self, order_id: i64) -> Result<Option<PaymentRecord>> {
        let cf = self.cf()?;
        let iter = self.db.iterator_cf(&cf, IteratorMode::Start);

        for item in iter {
            let (_key, value) = item?;
            let document: PaymentDocument = serde_json::from_slice(&value)?;
            if document.order_id == order_id {
                return Ok(Some(document.into_record()?));
            }
        }
        Ok(None)
    }

    async fn create(&self, payment: Payment) -> Result<PaymentRecord> {
        let amount = payment
            .amount
            .to_f64()
            .ok_or_else(|| PaymentError::InvalidAmount(payment.amount.to_string()))?;
        let now = Utc::now();
        let document = PaymentDocument {
            id: self.next_payment_id()?,
            order_id: payment.order_id,
            amount,
            status: payment.status,
            external_id: payment.external_id,
            created_at: now,
            updated_at: now,
        };

        self.put_document(&document)?;
        document.into_record()
    }

    async fn update_status(
        &self,
        payment_id: i64,
        status: PaymentStatus,
    ) -> Result<Option<PaymentRecord>> {
        let Some(mut document) = self.get_document(payment_id)? else {
            return Ok(None);
        };
        document.status = status;
        document.updated_at = Utc::now();

        self.put_document(&document)?;
        Ok(Some(document.into_record()?))
    }

    async fn update_external_id(
        &self,
        payment_id: i64,
        external_id: &str,
    ) -> Result<Option<PaymentRecord>> {
        let Some(mut document) = self.get_document(payment_id)? else {
            return Ok(None);
        };
        document.external_id = Some(external_id.to_string());
        document.updated_at = Utc::now();

        self.put_document(&document)?;
        Ok(Some(document.into_record()?))
    }
}
