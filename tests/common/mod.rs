use payments_service::domain::payment::{Payment, PaymentStatus};
use rust_decimal::Decimal;

pub fn payment(order_id: i64, amount: Decimal) -> Payment {
    Payment {
        order_id,
        amount,
        status: PaymentStatus::Pending,
        external_id: None,
    }
}
