use crate::application::service::PaymentService;
use crate::domain::payment::{Payment, PaymentRecord, PaymentStatus, QrCodeRequest};
use crate::domain::ports::OrdersGateway;
use crate::error::PaymentError;
use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, patch, post};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Shared state for the HTTP controller: the use-case layer plus the
/// outbound orders gateway. The controller validates orders and syncs
/// status changes; the use-case layer never talks to the orders service.
#[derive(Clone)]
pub struct AppState {
    pub payments: Arc<PaymentService>,
    pub orders: Arc<dyn OrdersGateway>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/api/v1/payments", get(get_all_payments).post(create_payment))
        .route("/api/v1/payments/qrcode", post(generate_qr_code))
        .route("/api/v1/payments/webhook", post(payment_webhook))
        .route("/api/v1/payments/order/:order_id", get(get_payment_by_order))
        .route("/api/v1/payments/:payment_id", get(get_payment))
        .route(
            "/api/v1/payments/:payment_id/status/:status",
            patch(update_payment_status),
        )
        .with_state(state)
}

fn storage_error(err: PaymentError) -> StatusCode {
    error!("repository failure: {err}");
    StatusCode::INTERNAL_SERVER_ERROR
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "service": "payments-service" }))
}

async fn get_all_payments(
    State(state): State<AppState>,
) -> Result<Json<Vec<PaymentRecord>>, StatusCode> {
    let payments = state
        .payments
        .get_all_payments()
        .await
        .map_err(storage_error)?;
    Ok(Json(payments))
}

async fn get_payment(
    State(state): State<AppState>,
    Path(payment_id): Path<i64>,
) -> Result<Json<PaymentRecord>, StatusCode> {
    state
        .payments
        .get_payment_by_id(payment_id)
        .await
        .map_err(storage_error)?
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn get_payment_by_order(
    State(state): State<AppState>,
    Path(order_id): Path<i64>,
) -> Result<Json<PaymentRecord>, StatusCode> {
    state
        .payments
        .get_payment_by_order_id(order_id)
        .await
        .map_err(storage_error)?
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn create_payment(
    State(state): State<AppState>,
    Json(payment): Json<Payment>,
) -> Result<(StatusCode, Json<PaymentRecord>), StatusCode> {
    if state.orders.get_order(payment.order_id).await.is_none() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let existing = state
        .payments
        .get_payment_by_order_id(payment.order_id)
        .await
        .map_err(storage_error)?;
    if existing.is_some() {
        return Err(StatusCode::BAD_REQUEST);
    }

    info!("creating payment for order {}", payment.order_id);
    let created = state
        .payments
        .create_payment(payment)
        .await
        .map_err(storage_error)?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn generate_qr_code(
    State(state): State<AppState>,
    Json(request): Json<QrCodeRequest>,
) -> Result<Json<Value>, StatusCode> {
    if state.orders.get_order(request.order_id).await.is_none() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let qr_code = state
        .payments
        .generate_qr_code(request)
        .await
        .map_err(storage_error)?;
    Ok(Json(json!({ "qr_code": qr_code })))
}

async fn update_payment_status(
    State(state): State<AppState>,
    Path((payment_id, status)): Path<(i64, String)>,
) -> Result<Json<PaymentRecord>, StatusCode> {
    let status: PaymentStatus = status.parse().map_err(|_| StatusCode::BAD_REQUEST)?;

    let updated = state
        .payments
        .update_payment_status(payment_id, status)
        .await
        .map_err(storage_error)?
        .ok_or(StatusCode::NOT_FOUND)?;

    sync_order_status(&state, &updated).await;
    Ok(Json(updated))
}

#[derive(Deserialize)]
struct WebhookParams {
    external_id: String,
    is_approved: bool,
}

async fn payment_webhook(
    State(state): State<AppState>,
    Query(params): Query<WebhookParams>,
) -> Result<Json<Value>, StatusCode> {
    info!("gateway callback for {}", params.external_id);

    let updated = state
        .payments
        .process_payment_callback(&params.external_id, params.is_approved)
        .await
        .map_err(storage_error)?
        .ok_or(StatusCode::NOT_FOUND)?;

    sync_order_status(&state, &updated).await;
    Ok(Json(json!({
        "status": "processed",
        "payment_id": updated.id.to_string(),
    })))
}

/// Fire-and-forget: the payment result does not depend on the orders
/// service acknowledging the sync.
async fn sync_order_status(state: &AppState, payment: &PaymentRecord) {
    if !state
        .orders
        .update_payment_status(payment.order_id, payment.status)
        .await
    {
        warn!(
            "orders service did not acknowledge status {} for order {}",
            payment.status, payment.order_id
        );
    }
}
