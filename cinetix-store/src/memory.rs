use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use cinetix_booking::{
    Reservation, ReservationRepository, ReservationStatus, SeatHold, SeatHoldRepository,
};
use cinetix_catalog::{Member, Screening, SeatLayout};
use cinetix_core::{
    Clock, CoreError, CoreResult, IdempotencyClaim, IdempotencyStore, MemberRepository,
    ScreeningRepository, SeatLayoutRepository, SoldSeatLookup, VipUsageService,
};
use cinetix_sale::{Payment, SaleCommit, SaleUnitOfWork, Ticket, TicketRepository};

#[derive(Debug, Clone)]
enum IdempotencyEntry {
    InFlight,
    Completed(serde_json::Value),
}

#[derive(Default)]
struct StoreState {
    screenings: HashMap<Uuid, Screening>,
    layouts: HashMap<Uuid, SeatLayout>,
    members: HashMap<Uuid, Member>,
    holds: HashMap<Uuid, SeatHold>,
    reservations: HashMap<Uuid, Reservation>,
    tickets: Vec<Ticket>,
    payments: Vec<Payment>,
    idempotency: HashMap<String, IdempotencyEntry>,
    vip_usage: HashMap<Uuid, u32>,
}

/// In-memory backing store. One `RwLock` over the whole state is the
/// serialization point every compound check-then-write relies on: hold
/// batch inserts, reservation creation, and `commit_sale` each run inside
/// a single write-guard acquisition, so concurrent same-seat callers are
/// mutually excluded and the loser sees a Conflict.
#[derive(Clone)]
pub struct MemoryStore {
    state: Arc<RwLock<StoreState>>,
    clock: Arc<dyn Clock>,
}

impl MemoryStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Arc::new(RwLock::new(StoreState::default())),
            clock,
        }
    }

    pub async fn insert_screening(&self, screening: Screening) {
        self.state
            .write()
            .await
            .screenings
            .insert(screening.id, screening);
    }

    pub async fn insert_layout(&self, layout: SeatLayout) {
        self.state.write().await.layouts.insert(layout.id, layout);
    }

    pub async fn insert_member(&self, member: Member) {
        self.state.write().await.members.insert(member.id, member);
    }

    pub async fn set_vip_usage(&self, member_id: Uuid, used_this_month: u32) {
        self.state
            .write()
            .await
            .vip_usage
            .insert(member_id, used_this_month);
    }

    pub async fn reservation(&self, id: Uuid) -> Option<Reservation> {
        self.state.read().await.reservations.get(&id).cloned()
    }

    pub async fn tickets_for_screening(&self, screening_id: Uuid) -> Vec<Ticket> {
        self.state
            .read()
            .await
            .tickets
            .iter()
            .filter(|t| t.screening_id == screening_id)
            .cloned()
            .collect()
    }

    pub async fn payments(&self) -> Vec<Payment> {
        self.state.read().await.payments.clone()
    }

    pub async fn active_hold_count(&self, screening_id: Uuid) -> usize {
        let now = self.clock.now();
        self.state
            .read()
            .await
            .holds
            .values()
            .filter(|h| h.screening_id == screening_id && !h.is_expired(now))
            .count()
    }
}

fn remove_owned_holds(
    state: &mut StoreState,
    screening_id: Uuid,
    seat_ids: &[Uuid],
    client_token: &str,
    user_id: Option<Uuid>,
) -> usize {
    let doomed: Vec<Uuid> = state
        .holds
        .values()
        .filter(|h| {
            h.screening_id == screening_id
                && seat_ids.contains(&h.seat_id)
                && h.is_owned_by(client_token, user_id)
        })
        .map(|h| h.id)
        .collect();
    for id in &doomed {
        state.holds.remove(id);
    }
    doomed.len()
}

#[async_trait]
impl ScreeningRepository for MemoryStore {
    async fn get_screening(&self, id: Uuid) -> CoreResult<Option<Screening>> {
        Ok(self.state.read().await.screenings.get(&id).cloned())
    }
}

#[async_trait]
impl SeatLayoutRepository for MemoryStore {
    async fn get_layout(&self, id: Uuid) -> CoreResult<Option<SeatLayout>> {
        Ok(self.state.read().await.layouts.get(&id).cloned())
    }
}

#[async_trait]
impl MemberRepository for MemoryStore {
    async fn get_member(&self, id: Uuid) -> CoreResult<Option<Member>> {
        Ok(self.state.read().await.members.get(&id).cloned())
    }
}

#[async_trait]
impl SoldSeatLookup for MemoryStore {
    async fn sold_seats(&self, screening_id: Uuid, seat_ids: &[Uuid]) -> CoreResult<Vec<Uuid>> {
        Ok(self
            .state
            .read()
            .await
            .tickets
            .iter()
            .filter(|t| t.screening_id == screening_id && seat_ids.contains(&t.seat_id))
            .map(|t| t.seat_id)
            .collect())
    }
}

#[async_trait]
impl VipUsageService for MemoryStore {
    async fn vip_free_tickets_used_this_month(&self, member_id: Uuid) -> CoreResult<u32> {
        Ok(*self
            .state
            .read()
            .await
            .vip_usage
            .get(&member_id)
            .unwrap_or(&0))
    }
}

#[async_trait]
impl SeatHoldRepository for MemoryStore {
    async fn insert_active_holds(&self, holds: Vec<SeatHold>) -> CoreResult<Vec<SeatHold>> {
        let now = self.clock.now();
        let mut state = self.state.write().await;

        // Check-then-insert under one write guard; this is the uniqueness
        // constraint for active holds.
        let mut conflicts: Vec<(Uuid, DateTime<Utc>)> = Vec::new();
        let mut replaced: Vec<Uuid> = Vec::new();
        for incoming in &holds {
            let existing = state.holds.values().find(|h| {
                h.screening_id == incoming.screening_id
                    && h.seat_id == incoming.seat_id
                    && !h.is_expired(now)
            });
            if let Some(existing) = existing {
                if existing.is_owned_by(&incoming.client_token, incoming.user_id) {
                    replaced.push(existing.id);
                } else {
                    conflicts.push((existing.seat_id, existing.expires_at));
                }
            }
        }

        if let Some(earliest) = conflicts.iter().map(|(_, exp)| *exp).min() {
            let seats = conflicts
                .iter()
                .map(|(seat, _)| seat.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            return Err(CoreError::conflict(format!(
                "seats already held: {seats} (earliest conflicting hold expires at {earliest})"
            )));
        }

        for id in replaced {
            state.holds.remove(&id);
        }
        let inserted = holds.clone();
        for hold in holds {
            state.holds.insert(hold.id, hold);
        }
        Ok(inserted)
    }

    async fn get_hold(&self, hold_id: Uuid) -> CoreResult<Option<SeatHold>> {
        Ok(self.state.read().await.holds.get(&hold_id).cloned())
    }

    async fn update_hold_expiry(
        &self,
        hold_id: Uuid,
        expires_at: DateTime<Utc>,
        heartbeat_at: DateTime<Utc>,
    ) -> CoreResult<SeatHold> {
        let mut state = self.state.write().await;
        let hold = state
            .holds
            .get_mut(&hold_id)
            .ok_or_else(|| CoreError::not_found(format!("hold {hold_id}")))?;
        hold.expires_at = expires_at;
        hold.last_heartbeat_at = heartbeat_at;
        Ok(hold.clone())
    }

    async fn delete_hold(&self, hold_id: Uuid) -> CoreResult<bool> {
        Ok(self.state.write().await.holds.remove(&hold_id).is_some())
    }

    async fn active_holds_for_seats(
        &self,
        screening_id: Uuid,
        seat_ids: &[Uuid],
        now: DateTime<Utc>,
    ) -> CoreResult<Vec<SeatHold>> {
        Ok(self
            .state
            .read()
            .await
            .holds
            .values()
            .filter(|h| {
                h.screening_id == screening_id
                    && seat_ids.contains(&h.seat_id)
                    && !h.is_expired(now)
            })
            .cloned()
            .collect())
    }

    async fn delete_holds_for_owner(
        &self,
        screening_id: Uuid,
        seat_ids: &[Uuid],
        client_token: &str,
        user_id: Option<Uuid>,
    ) -> CoreResult<usize> {
        let mut state = self.state.write().await;
        Ok(remove_owned_holds(
            &mut state,
            screening_id,
            seat_ids,
            client_token,
            user_id,
        ))
    }

    async fn delete_expired(&self, now: DateTime<Utc>, batch_size: usize) -> CoreResult<usize> {
        let mut state = self.state.write().await;
        let doomed: Vec<Uuid> = state
            .holds
            .values()
            .filter(|h| h.is_expired(now))
            .take(batch_size)
            .map(|h| h.id)
            .collect();
        for id in &doomed {
            state.holds.remove(id);
        }
        Ok(doomed.len())
    }
}

#[async_trait]
impl ReservationRepository for MemoryStore {
    async fn active_reservations_for_seats(
        &self,
        screening_id: Uuid,
        seat_ids: &[Uuid],
    ) -> CoreResult<Vec<Reservation>> {
        Ok(self
            .state
            .read()
            .await
            .reservations
            .values()
            .filter(|r| {
                r.screening_id == screening_id
                    && seat_ids.contains(&r.seat_id)
                    && r.status.is_sellable()
            })
            .cloned()
            .collect())
    }

    async fn insert_pending_and_consume_holds(
        &self,
        reservations: Vec<Reservation>,
        client_token: &str,
        user_id: Option<Uuid>,
    ) -> CoreResult<()> {
        let mut state = self.state.write().await;
        let screening_id = match reservations.first() {
            Some(r) => r.screening_id,
            None => return Ok(()),
        };
        let seat_ids: Vec<Uuid> = reservations.iter().map(|r| r.seat_id).collect();

        // The manager validated under an earlier read lock; a concurrent
        // batch may have won since. Re-check every seat claim under this
        // write guard before mutating anything.
        let now = self.clock.now();
        for &seat_id in &seat_ids {
            if state.reservations.values().any(|r| {
                r.screening_id == screening_id && r.seat_id == seat_id && r.status.is_sellable()
            }) {
                return Err(CoreError::conflict(format!(
                    "seat {seat_id} is already reserved"
                )));
            }
            if state
                .tickets
                .iter()
                .any(|t| t.screening_id == screening_id && t.seat_id == seat_id)
            {
                return Err(CoreError::conflict(format!("seat {seat_id} already sold")));
            }
            let covered = state.holds.values().any(|h| {
                h.screening_id == screening_id
                    && h.seat_id == seat_id
                    && !h.is_expired(now)
                    && h.is_owned_by(client_token, user_id)
            });
            if !covered {
                return Err(CoreError::conflict(format!(
                    "seat {seat_id} is no longer held by the requesting client"
                )));
            }
        }

        let removed = remove_owned_holds(&mut state, screening_id, &seat_ids, client_token, user_id);
        debug!(removed, "holds consumed by reservation");
        for reservation in reservations {
            state.reservations.insert(reservation.id, reservation);
        }
        Ok(())
    }

    async fn reservations_by_group(&self, group_id: Uuid) -> CoreResult<Vec<Reservation>> {
        let mut rows: Vec<Reservation> = self
            .state
            .read()
            .await
            .reservations
            .values()
            .filter(|r| r.group_id == group_id)
            .cloned()
            .collect();
        rows.sort_by_key(|r| r.created_at);
        Ok(rows)
    }

    async fn update_reservation_status(
        &self,
        reservation_id: Uuid,
        status: ReservationStatus,
    ) -> CoreResult<()> {
        let mut state = self.state.write().await;
        let reservation = state
            .reservations
            .get_mut(&reservation_id)
            .ok_or_else(|| CoreError::not_found(format!("reservation {reservation_id}")))?;
        reservation.status = status;
        Ok(())
    }

    async fn pending_expired(&self, now: DateTime<Utc>) -> CoreResult<Vec<Reservation>> {
        Ok(self
            .state
            .read()
            .await
            .reservations
            .values()
            .filter(|r| r.status == ReservationStatus::Pending && r.expires_at <= now)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl TicketRepository for MemoryStore {
    async fn ticket_exists(&self, screening_id: Uuid, seat_id: Uuid) -> CoreResult<bool> {
        Ok(self
            .state
            .read()
            .await
            .tickets
            .iter()
            .any(|t| t.screening_id == screening_id && t.seat_id == seat_id))
    }

    async fn code_exists(&self, ticket_code: &str) -> CoreResult<bool> {
        Ok(self
            .state
            .read()
            .await
            .tickets
            .iter()
            .any(|t| t.ticket_code == ticket_code))
    }
}

#[async_trait]
impl SaleUnitOfWork for MemoryStore {
    async fn commit_sale(&self, commit: SaleCommit) -> CoreResult<()> {
        let mut state = self.state.write().await;

        // Re-check both uniqueness invariants under the write guard; a
        // concurrent sale that won the race surfaces here as Conflict and
        // nothing from this commit is persisted.
        for ticket in &commit.tickets {
            if state
                .tickets
                .iter()
                .any(|t| t.screening_id == ticket.screening_id && t.seat_id == ticket.seat_id)
            {
                return Err(CoreError::conflict(format!(
                    "seat {} already sold",
                    ticket.seat_id
                )));
            }
            if state
                .tickets
                .iter()
                .any(|t| t.ticket_code == ticket.ticket_code)
            {
                return Err(CoreError::conflict(format!(
                    "ticket code {} already issued",
                    ticket.ticket_code
                )));
            }
        }

        state.payments.push(commit.payment);
        state.tickets.extend(commit.tickets);

        if let Some(group_id) = commit.complete_reservation_group {
            for reservation in state
                .reservations
                .values_mut()
                .filter(|r| r.group_id == group_id)
            {
                reservation.status = ReservationStatus::Completed;
            }
        }
        if let Some(release) = commit.release_holds_for {
            remove_owned_holds(
                &mut state,
                release.screening_id,
                &release.seat_ids,
                &release.client_token,
                release.user_id,
            );
        }
        Ok(())
    }
}

#[async_trait]
impl IdempotencyStore for MemoryStore {
    async fn claim(&self, key: &str) -> CoreResult<IdempotencyClaim> {
        // Get-or-create in one write-guard acquisition: of two concurrent
        // claims for the same key, exactly one sees Acquired.
        let mut state = self.state.write().await;
        Ok(match state.idempotency.get(key) {
            Some(IdempotencyEntry::Completed(value)) => IdempotencyClaim::Completed(value.clone()),
            Some(IdempotencyEntry::InFlight) => IdempotencyClaim::InFlight,
            None => {
                state
                    .idempotency
                    .insert(key.to_string(), IdempotencyEntry::InFlight);
                IdempotencyClaim::Acquired
            }
        })
    }

    async fn complete(&self, key: &str, value: serde_json::Value) -> CoreResult<()> {
        self.state
            .write()
            .await
            .idempotency
            .insert(key.to_string(), IdempotencyEntry::Completed(value));
        Ok(())
    }

    async fn release(&self, key: &str) -> CoreResult<()> {
        let mut state = self.state.write().await;
        if matches!(state.idempotency.get(key), Some(IdempotencyEntry::InFlight)) {
            state.idempotency.remove(key);
        }
        Ok(())
    }
}
