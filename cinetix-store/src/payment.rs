use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use uuid::Uuid;

use cinetix_core::{CoreError, CoreResult, GatewayResult, PaymentGateway};

/// Gateway stand-in for development and tests. The payment method string
/// triggers the outcome: "declined-card" declines, "gateway-down" errors,
/// anything else captures.
#[derive(Default)]
pub struct MockPaymentGateway {
    calls: AtomicU32,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times the gateway was actually invoked; idempotent replays
    /// must not add to this.
    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn authorize_and_capture(
        &self,
        _amount_cents: i64,
        method: &str,
        _member_id: Option<Uuid>,
        _metadata: serde_json::Value,
    ) -> CoreResult<GatewayResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match method {
            "gateway-down" => Err(CoreError::internal("simulated gateway outage")),
            "declined-card" => Ok(GatewayResult::declined("card declined")),
            _ => Ok(GatewayResult::succeeded(format!(
                "mock_txn_{}",
                Uuid::new_v4().simple()
            ))),
        }
    }
}
