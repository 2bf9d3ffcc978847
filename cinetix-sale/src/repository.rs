use async_trait::async_trait;
use uuid::Uuid;

use cinetix_core::CoreResult;

use crate::models::{Payment, Ticket};

/// Read access to persisted tickets, used for pre-checks and the
/// code-uniqueness retry loop.
#[async_trait]
pub trait TicketRepository: Send + Sync {
    async fn ticket_exists(&self, screening_id: Uuid, seat_id: Uuid) -> CoreResult<bool>;

    async fn code_exists(&self, ticket_code: &str) -> CoreResult<bool>;
}

/// Everything the post-payment transaction writes, committed atomically.
#[derive(Debug, Clone)]
pub struct SaleCommit {
    pub payment: Payment,
    pub tickets: Vec<Ticket>,
    /// Mark every reservation in this group Completed.
    pub complete_reservation_group: Option<Uuid>,
    /// Remove remaining holds for these seats owned by (token, member).
    pub release_holds_for: Option<HoldRelease>,
}

#[derive(Debug, Clone)]
pub struct HoldRelease {
    pub screening_id: Uuid,
    pub seat_ids: Vec<Uuid>,
    pub client_token: String,
    pub user_id: Option<Uuid>,
}

/// The sale transaction boundary. The implementation must persist the
/// whole commit or none of it, re-checking (screening, seat) and
/// ticket-code uniqueness under the same serialization so concurrent
/// sales of one seat cannot both land.
#[async_trait]
pub trait SaleUnitOfWork: Send + Sync {
    async fn commit_sale(&self, commit: SaleCommit) -> CoreResult<()>;
}
