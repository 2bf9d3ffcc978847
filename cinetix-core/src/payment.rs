use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::CoreResult;

/// Outcome of a single authorize-and-capture call. A decline is a normal
/// result (`is_success == false`), not an error; `Err` is reserved for
/// transport/system failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayResult {
    pub is_success: bool,
    pub transaction_id: Option<String>,
    pub error_message: Option<String>,
}

impl GatewayResult {
    pub fn succeeded(transaction_id: impl Into<String>) -> Self {
        Self {
            is_success: true,
            transaction_id: Some(transaction_id.into()),
            error_message: None,
        }
    }

    pub fn declined(reason: impl Into<String>) -> Self {
        Self {
            is_success: false,
            transaction_id: None,
            error_message: Some(reason.into()),
        }
    }
}

/// Single-shot payment provider contract. No auth/capture split is
/// modeled; the provider call must carry a bounded timeout so a hung
/// gateway cannot hang the request.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn authorize_and_capture(
        &self,
        amount_cents: i64,
        method: &str,
        member_id: Option<Uuid>,
        metadata: serde_json::Value,
    ) -> CoreResult<GatewayResult>;
}
