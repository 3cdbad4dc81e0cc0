use crate::domain::payment::{Payment, PaymentRecord, PaymentStatus, QrCodeRequest};
use crate::domain::ports::PaymentRepositoryBox;
use crate::error::Result;
use uuid::Uuid;

/// Business-rule layer between the request boundary and a payment store.
///
/// `PaymentService` owns one repository, injected by the caller; it never
/// knows which backend it holds. The rules it enforces are the ones no
/// backend enforces on its own: every new payment starts `Pending`, and
/// QR-code generation attaches to an existing payment for the order rather
/// than creating a second one.
pub struct PaymentService {
    repository: PaymentRepositoryBox,
}

impl PaymentService {
    pub fn new(repository: PaymentRepositoryBox) -> Self {
        Self { repository }
    }

    pub async fn get_all_payments(&self) -> Result<Vec<PaymentRecord>> {
        self.repository.get_all().await
    }

    pub async fn get_payment_by_id(&self, payment_id: i64) -> Result<Option<PaymentRecord>> {
        self.repository.get_by_id(payment_id).await
    }

    pub async fn get_payment_by_order_id(&self, order_id: i64) -> Result<Option<PaymentRecord>> {
        self.repository.get_by_order_id(order_id).await
    }

    /// Persists a new payment, forcing the status to `Pending` regardless
    /// of what the caller passed in.
    pub async fn create_payment(&self, payment: Payment) -> Result<PaymentRecord> {
        let payment = Payment {
            status: PaymentStatus::Pending,
            ..payment
        };
        self.repository.create(payment).await
    }

    /// No transition guard here: any status can move to any other.
    pub async fn update_payment_status(
        &self,
        payment_id: i64,
        status: PaymentStatus,
    ) -> Result<Option<PaymentRecord>> {
        self.repository.update_status(payment_id, status).await
    }

    /// Simulates QR-code generation for an order by minting a gateway-style
    /// external id.
    ///
    /// If the order already has a payment, the new id is attached to that
    /// record (its status untouched); otherwise a fresh `Pending` payment
    /// is created for the requested total. Either way an order ends up with
    /// a single in-flight payment carrying the returned id.
    pub async fn generate_qr_code(&self, request: QrCodeRequest) -> Result<String> {
        let external_id = format!("PAY-{}", Uuid::new_v4());

        match self.repository.get_by_order_id(request.order_id).await? {
            Some(existing) => {
                self.repository
                    .update_external_id(existing.id, &external_id)
                    .await?;
            }
            None => {
                self.repository
                    .create(Payment {
                        order_id: request.order_id,
                        amount: request.total,
                        status: PaymentStatus::Pending,
                        external_id: Some(external_id.clone()),
                    })
                    .await?;
            }
        }

        Ok(external_id)
    }

    /// Handles an inbound gateway notification for `external_id`.
    ///
    /// External ids are not indexed anywhere, so resolution is a scan over
    /// every record; the first match wins. No match is a no-op, not an
    /// error.
    pub async fn process_payment_callback(
        &self,
        external_id: &str,
        is_approved: bool,
    ) -> Result<Option<PaymentRecord>> {
        let payments = self.repository.get_all().await?;
        let Some(matching) = payments
            .iter()
            .find(|p| p.external_id.as_deref() == Some(external_id))
        else {
            return Ok(None);
        };

        let status = if is_approved {
            PaymentStatus::Approved
        } else {
            PaymentStatus::Denied
        };
        self.repository.update_status(matching.id, status).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::in_memory::InMemoryPaymentRepository;
    use rust_decimal_macros::dec;

    fn service() -> PaymentService {
        PaymentService::new(Box::new(InMemoryPaymentRepository::new()))
    }

    #[tokio::test]
    async fn test_create_payment_forces_pending() {
        let service = service();

        let created = service
            .create_payment(Payment {
                order_id: 1,
                amount: dec!(10.00),
                status: PaymentStatus::Approved,
                external_id: None,
            })
            .await
            .unwrap();

        assert_eq!(created.id, 1);
        assert_eq!(created.status, PaymentStatus::Pending);
        assert_eq!(created.amount, dec!(10.00));
    }

    #[tokio::test]
    async fn test_generate_qr_code_creates_pending_payment() {
        let service = service();

        let external_id = service
            .generate_qr_code(QrCodeRequest {
                description: "order 3".to_string(),
                total: dec!(20.00),
                order_id: 3,
            })
            .await
            .unwrap();

        assert!(external_id.starts_with("PAY-"));

        let payments = service.get_all_payments().await.unwrap();
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].status, PaymentStatus::Pending);
        assert_eq!(payments[0].amount, dec!(20.00));
        assert_eq!(payments[0].external_id.as_deref(), Some(external_id.as_str()));
    }

    #[tokio::test]
    async fn test_generate_qr_code_attaches_to_existing_payment() {
        let service = service();

        let existing = service
            .create_payment(Payment {
                order_id: 5,
                amount: dec!(25.98),
                status: PaymentStatus::Pending,
                external_id: Some("PAY-old".to_string()),
            })
            .await
            .unwrap();

        let external_id = service
            .generate_qr_code(QrCodeRequest {
                description: "retry".to_string(),
                total: dec!(20.00),
                order_id: 5,
            })
            .await
            .unwrap();

        // Still a single record for the order, re-pointed at the new id.
        let payments = service.get_all_payments().await.unwrap();
        assert_eq!(payments.len(), 1);

        let updated = service.get_payment_by_order_id(5).await.unwrap().unwrap();
        assert_eq!(updated.id, existing.id);
        assert_eq!(updated.external_id.as_deref(), Some(external_id.as_str()));
        assert_eq!(updated.status, PaymentStatus::Pending);
        assert_eq!(updated.amount, dec!(25.98));
    }

    #[tokio::test]
    async fn test_callback_approves_matching_payment_only() {
        let service = service();

        service
            .create_payment(Payment {
                order_id: 1,
                amount: dec!(25.98),
                status: PaymentStatus::Pending,
                external_id: Some("PAY-X".to_string()),
            })
            .await
            .unwrap();
        service
            .create_payment(Payment {
                order_id: 2,
                amount: dec!(15.99),
                status: PaymentStatus::Pending,
                external_id: Some("PAY-other".to_string()),
            })
            .await
            .unwrap();

        let updated = service
            .process_payment_callback("PAY-X", true)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, PaymentStatus::Approved);

        let untouched = service.get_payment_by_order_id(2).await.unwrap().unwrap();
        assert_eq!(untouched.status, PaymentStatus::Pending);
    }

    #[tokio::test]
    async fn test_callback_denies_when_not_approved() {
        let service = service();

        service
            .create_payment(Payment {
                order_id: 1,
                amount: dec!(25.98),
                status: PaymentStatus::Pending,
                external_id: Some("PAY-X".to_string()),
            })
            .await
            .unwrap();

        let updated = service
            .process_payment_callback("PAY-X", false)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, PaymentStatus::Denied);
    }

    #[tokio::test]
    async fn test_callback_unknown_external_id_is_a_no_op() {
        let service = service();

        service
            .create_payment(Payment {
                order_id: 1,
                amount: dec!(10.00),
                status: PaymentStatus::Pending,
                external_id: Some("PAY-known".to_string()),
            })
            .await
            .unwrap();

        let result = service
            .process_payment_callback("PAY-nonexistent", true)
            .await
            .unwrap();
        assert!(result.is_none());

        let payments = service.get_all_payments().await.unwrap();
        assert_eq!(payments[0].status, PaymentStatus::Pending);
    }

    #[tokio::test]
    async fn test_update_status_missing_id_is_none() {
        let service = service();

        let result = service
            .update_payment_status(999, PaymentStatus::Approved)
            .await
            .unwrap();
        assert!(result.is_none());
    }
}
