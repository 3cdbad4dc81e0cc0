use super::payment::{Payment, PaymentRecord, PaymentStatus};
use crate::error::Result;
use async_trait::async_trait;

/// Capability contract any payment store must implement.
///
/// Absence is always signaled as `Ok(None)`, never as an error, so callers
/// can tell "nothing to update" apart from a store failure.
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// All records, order unspecified.
    async fn get_all(&self) -> Result<Vec<PaymentRecord>>;

    async fn get_by_id(&self, payment_id: i64) -> Result<Option<PaymentRecord>>;

    /// First record for the order. Which one is returned when a backend
    /// holds duplicates is unspecified.
    async fn get_by_order_id(&self, order_id: i64) -> Result<Option<PaymentRecord>>;

    /// Assigns identity and timestamps, persists, returns the stored form.
    async fn create(&self, payment: Payment) -> Result<PaymentRecord>;

    /// Applies the status and refreshes `updated_at`. `None` when no record
    /// with that id exists.
    async fn update_status(
        &self,
        payment_id: i64,
        status: PaymentStatus,
    ) -> Result<Option<PaymentRecord>>;

    /// Same contract as `update_status`, for the external id field.
    async fn update_external_id(
        &self,
        payment_id: i64,
        external_id: &str,
    ) -> Result<Option<PaymentRecord>>;
}

pub type PaymentRepositoryBox = Box<dyn PaymentRepository>;

/// Outbound contract to the orders service. Failures never surface as
/// errors: the payments core does not depend on the orders side being up.
#[async_trait]
pub trait OrdersGateway: Send + Sync {
    /// Order payload, or `None` when the order does not exist or the
    /// service is unreachable.
    async fn get_order(&self, order_id: i64) -> Option<serde_json::Value>;

    /// Fire-and-forget status sync. Returns whether the orders service
    /// acknowledged the update.
    async fn update_payment_status(&self, order_id: i64, status: PaymentStatus) -> bool;
}
