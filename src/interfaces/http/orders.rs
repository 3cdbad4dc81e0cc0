use crate::domain::payment::PaymentStatus;
use crate::domain::ports::OrdersGateway;
use async_trait::async_trait;
use serde_json::Value;

/// HTTP client for the orders service.
///
/// Transport failures never escape this adapter: a lookup that fails for
/// any reason is "order not found", and a status sync that fails reports
/// `false`.
pub struct HttpOrdersClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpOrdersClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl OrdersGateway for HttpOrdersClient {
    async fn get_order(&self, order_id: i64) -> Option<Value> {
        let url = format!("{}/api/v1/orders/{}", self.base_url, order_id);
        match self.client.get(&url).send().await {
            Ok(response) if response.status() == reqwest::StatusCode::OK => {
                response.json().await.ok()
            }
            _ => None,
        }
    }

    async fn update_payment_status(&self, order_id: i64, status: PaymentStatus) -> bool {
        let url = format!(
            "{}/api/v1/orders/{}/payment-status/{}",
            self.base_url, order_id, status
        );
        match self.client.patch(&url).send().await {
            Ok(response) => response.status() == reqwest::StatusCode::OK,
            Err(_) => false,
        }
    }
}
