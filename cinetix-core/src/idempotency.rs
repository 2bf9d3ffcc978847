use async_trait::async_trait;

use crate::CoreResult;

/// Outcome of claiming an idempotency key.
#[derive(Debug, Clone)]
pub enum IdempotencyClaim {
    /// The caller now owns the key and must finish it with `complete` or
    /// `release`.
    Acquired,
    /// A previous request already finished; replay its stored response.
    Completed(serde_json::Value),
    /// Another request owns the key right now.
    InFlight,
}

/// Response cache keyed by client-supplied idempotency keys. `claim` is an
/// atomic get-or-create: of any number of concurrent callers with the same
/// key, exactly one acquires it, so a duplicate request can never reach the
/// payment gateway while the first is still in flight.
#[async_trait]
pub trait IdempotencyStore: Send + Sync {
    async fn claim(&self, key: &str) -> CoreResult<IdempotencyClaim>;

    /// Store the final response; the key stays claimed and replays forever.
    async fn complete(&self, key: &str, value: serde_json::Value) -> CoreResult<()>;

    /// Free an acquired key without storing a response, so the caller may
    /// retry it (declines, validation failures).
    async fn release(&self, key: &str) -> CoreResult<()>;
}
