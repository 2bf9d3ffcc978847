use async_trait::async_trait;
use uuid::Uuid;

use crate::CoreResult;

/// Monthly free-ticket usage per VIP member, backed by historical ticket
/// data outside the core.
#[async_trait]
pub trait VipUsageService: Send + Sync {
    async fn vip_free_tickets_used_this_month(&self, member_id: Uuid) -> CoreResult<u32>;
}
