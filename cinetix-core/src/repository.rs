use async_trait::async_trait;
use cinetix_catalog::{Member, Screening, SeatLayout};
use uuid::Uuid;

use crate::CoreResult;

/// Read access to scheduled screenings.
#[async_trait]
pub trait ScreeningRepository: Send + Sync {
    async fn get_screening(&self, id: Uuid) -> CoreResult<Option<Screening>>;
}

/// Read access to hall seat layouts.
#[async_trait]
pub trait SeatLayoutRepository: Send + Sync {
    async fn get_layout(&self, id: Uuid) -> CoreResult<Option<SeatLayout>>;
}

/// Read access to members for VIP/eligibility checks.
#[async_trait]
pub trait MemberRepository: Send + Sync {
    async fn get_member(&self, id: Uuid) -> CoreResult<Option<Member>>;
}

/// Which of the given seats already carry a ticket for the screening.
/// Backed by ticket storage; exposed separately so hold/reservation code
/// can check sold state without seeing ticket internals.
#[async_trait]
pub trait SoldSeatLookup: Send + Sync {
    async fn sold_seats(&self, screening_id: Uuid, seat_ids: &[Uuid]) -> CoreResult<Vec<Uuid>>;
}
