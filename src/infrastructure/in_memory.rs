use crate::domain::payment::{Payment, PaymentRecord, PaymentStatus};
use crate::domain::ports::PaymentRepository;
use crate::error::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory payment store.
///
/// Uses `Arc<RwLock<BTreeMap<i64, PaymentRecord>>>` to allow shared
/// concurrent access; the ordered map makes identity assignment a cheap
/// last-key read. Ideal for tests or ephemeral runs where persistence is
/// not required.
#[derive(Default, Clone)]
pub struct InMemoryPaymentRepository {
    payments: Arc<RwLock<BTreeMap<i64, PaymentRecord>>>,
}

impl InMemoryPaymentRepository {
    /// Creates a new, empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentRepository for InMemoryPaymentRepository {
    async fn get_all(&self) -> Result<Vec<PaymentRecord>> {
        let payments = self.payments.read().await;
        Ok(payments.values().cloned().collect())
    }

    async fn get_by_id(&self, payment_id: i64) -> Result<Option<PaymentRecord>> {
        let payments = self.payments.read().await;
        Ok(payments.get(&payment_id).cloned())
    }

    async fn get_by_order_id(&self, order_id: i64) -> Result<Option<PaymentRecord>> {
        let payments = self.payments.read().await;
        Ok(payments.values().find(|p| p.order_id == order_id).cloned())
    }

    async fn create(&self, payment: Payment) -> Result<PaymentRecord> {
        let mut payments = self.payments.write().await;
        let payment_id = payments.keys().next_back().map_or(1, |id| id + 1);
        let now = Utc::now();
        let record = PaymentRecord {
            id: payment_id,
            order_id: payment.order_id,
            amount: payment.amount,
            status: payment.status,
            external_id: payment.external_id,
            created_at: now,
            updated_at: now,
        };
        payments.insert(payment_id, record.clone());
        Ok(record)
    }

    async fn update_status(
        &self,
        payment_id: i64,
        status: PaymentStatus,
    ) -> Result<Option<PaymentRecord>> {
        let mut payments = self.payments.write().await;
        Ok(payments.get_mut(&payment_id).map(|record| {
            record.status = status;
            record.updated_at = Utc::now();
            record.clone()
        }))
    }

    async fn update_external_id(
        &self,
        payment_id: i64,
        external_id: &str,
    ) -> Result<Option<PaymentRecord>> {
        let mut payments = self.payments.write().await;
        Ok(payments.get_mut(&payment_id).map(|record| {
            record.external_id = Some(external_id.to_string());
            record.updated_at = Utc::now();
            record.clone()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn payment(order_id: i64) -> Payment {
        Payment {
            order_id,
            amount: dec!(10.00),
            status: PaymentStatus::Pending,
            external_id: None,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let repository = InMemoryPaymentRepository::new();

        let first = repository.create(payment(1)).await.unwrap();
        let second = repository.create(payment(2)).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(repository.get_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_get_by_order_id() {
        let repository = InMemoryPaymentRepository::new();
        repository.create(payment(5)).await.unwrap();

        let found = repository.get_by_order_id(5).await.unwrap().unwrap();
        assert_eq!(found.order_id, 5);

        assert!(repository.get_by_order_id(6).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_status_missing_id_is_none() {
        let repository = InMemoryPaymentRepository::new();
        let updated = repository
            .update_status(999, PaymentStatus::Approved)
            .await
            .unwrap();
        assert!(updated.is_none());
    }

    #[tokio::test]
    async fn test_update_external_id() {
        let repository = InMemoryPaymentRepository::new();
        let created = repository.create(payment(1)).await.unwrap();

        let updated = repository
            .update_external_id(created.id, "PAY-abc")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.external_id.as_deref(), Some("PAY-abc"));
        assert_eq!(updated.status, PaymentStatus::Pending);
    }
}
