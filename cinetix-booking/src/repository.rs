use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use cinetix_core::CoreResult;

use crate::models::{Reservation, ReservationStatus, SeatHold};

/// Persistence contract for seat holds. `insert_active_holds` is the
/// serialization point: the implementation must run its conflict check and
/// the insert as one atomic unit (uniqueness constraint, serializable
/// transaction, or a store-wide write lock) so two concurrent callers can
/// never both hold the same seat.
#[async_trait]
pub trait SeatHoldRepository: Send + Sync {
    /// Inserts the batch if no seat has a conflicting active hold. Active
    /// holds already owned by the same (token, user) are replaced. On
    /// conflict returns `CoreError::Conflict` naming the seats and the
    /// earliest conflicting expiry; nothing is inserted.
    async fn insert_active_holds(&self, holds: Vec<SeatHold>) -> CoreResult<Vec<SeatHold>>;

    async fn get_hold(&self, hold_id: Uuid) -> CoreResult<Option<SeatHold>>;

    async fn update_hold_expiry(
        &self,
        hold_id: Uuid,
        expires_at: DateTime<Utc>,
        heartbeat_at: DateTime<Utc>,
    ) -> CoreResult<SeatHold>;

    /// Hard delete. Returns whether a row was removed.
    async fn delete_hold(&self, hold_id: Uuid) -> CoreResult<bool>;

    async fn active_holds_for_seats(
        &self,
        screening_id: Uuid,
        seat_ids: &[Uuid],
        now: DateTime<Utc>,
    ) -> CoreResult<Vec<SeatHold>>;

    /// Removes holds on the given seats owned by (token, user). Returns
    /// the number removed.
    async fn delete_holds_for_owner(
        &self,
        screening_id: Uuid,
        seat_ids: &[Uuid],
        client_token: &str,
        user_id: Option<Uuid>,
    ) -> CoreResult<usize>;

    /// Deletes up to `batch_size` holds with `expires_at <= now`.
    async fn delete_expired(&self, now: DateTime<Utc>, batch_size: usize) -> CoreResult<usize>;
}

/// Persistence contract for reservations.
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Reservations in Pending or Confirmed on any of the given seats.
    async fn active_reservations_for_seats(
        &self,
        screening_id: Uuid,
        seat_ids: &[Uuid],
    ) -> CoreResult<Vec<Reservation>>;

    /// Inserts the pending batch and removes the consumed holds in one
    /// atomic unit.
    async fn insert_pending_and_consume_holds(
        &self,
        reservations: Vec<Reservation>,
        client_token: &str,
        user_id: Option<Uuid>,
    ) -> CoreResult<()>;

    async fn reservations_by_group(&self, group_id: Uuid) -> CoreResult<Vec<Reservation>>;

    async fn update_reservation_status(
        &self,
        reservation_id: Uuid,
        status: ReservationStatus,
    ) -> CoreResult<()>;

    /// Pending reservations whose deadline has passed.
    async fn pending_expired(&self, now: DateTime<Utc>) -> CoreResult<Vec<Reservation>>;
}
