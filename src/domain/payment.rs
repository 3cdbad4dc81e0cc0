use crate::error::PaymentError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of a payment.
///
/// No transitions are enforced here: a record can move between any two
/// states through `update_status`. The only place a transition is driven by
/// business input is the gateway callback, which maps approval to
/// `Approved`/`Denied`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
pub enum PaymentStatus {
    Pending,
    Approved,
    Denied,
    Rejected,
    Unknown,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Approved => "Approved",
            PaymentStatus::Denied => "Denied",
            PaymentStatus::Rejected => "Rejected",
            PaymentStatus::Unknown => "Unknown",
        })
    }
}

impl FromStr for PaymentStatus {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(PaymentStatus::Pending),
            "Approved" => Ok(PaymentStatus::Approved),
            "Denied" => Ok(PaymentStatus::Denied),
            "Rejected" => Ok(PaymentStatus::Rejected),
            "Unknown" => Ok(PaymentStatus::Unknown),
            other => Err(PaymentError::InvalidStatus(other.to_string())),
        }
    }
}

/// A payment that has not been persisted yet.
///
/// `amount` is an exact base-10 decimal; currency values never pass through
/// binary floating point on their way into a store.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Payment {
    pub order_id: i64,
    pub amount: Decimal,
    pub status: PaymentStatus,
    pub external_id: Option<String>,
}

/// A payment as returned by a repository: identity and timestamps are
/// assigned by the store on creation, and `updated_at` is refreshed on every
/// mutation. `id` never changes once assigned.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct PaymentRecord {
    pub id: i64,
    pub order_id: i64,
    pub amount: Decimal,
    pub status: PaymentStatus,
    pub external_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request payload for simulated QR-code generation.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct QrCodeRequest {
    pub description: String,
    pub total: Decimal,
    pub order_id: i64,
}
