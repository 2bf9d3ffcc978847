use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, info};
use uuid::Uuid;

use cinetix_core::settings::{defaults, keys};
use cinetix_core::{
    Clock, CoreError, CoreResult, ScreeningRepository, SeatLayoutRepository, SettingsReader,
    SoldSeatLookup,
};

use crate::models::SeatHold;
use crate::repository::{ReservationRepository, SeatHoldRepository};

/// Creates, extends, releases and sweeps per-seat TTL locks. A hold is the
/// short-term tier of the seat lock hierarchy (hold → reservation →
/// ticket); only one tier may claim a seat at a time.
pub struct HoldManager {
    screenings: Arc<dyn ScreeningRepository>,
    layouts: Arc<dyn SeatLayoutRepository>,
    holds: Arc<dyn SeatHoldRepository>,
    reservations: Arc<dyn ReservationRepository>,
    sold: Arc<dyn SoldSeatLookup>,
    settings: Arc<dyn SettingsReader>,
    clock: Arc<dyn Clock>,
}

impl HoldManager {
    pub fn new(
        screenings: Arc<dyn ScreeningRepository>,
        layouts: Arc<dyn SeatLayoutRepository>,
        holds: Arc<dyn SeatHoldRepository>,
        reservations: Arc<dyn ReservationRepository>,
        sold: Arc<dyn SoldSeatLookup>,
        settings: Arc<dyn SettingsReader>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            screenings,
            layouts,
            holds,
            reservations,
            sold,
            settings,
            clock,
        }
    }

    pub async fn create_holds(
        &self,
        screening_id: Uuid,
        seat_ids: &[Uuid],
        client_token: &str,
        user_id: Option<Uuid>,
        ttl_seconds: Option<i64>,
    ) -> CoreResult<Vec<SeatHold>> {
        if client_token.trim().is_empty() {
            return Err(CoreError::validation("client token is required"));
        }
        if seat_ids.is_empty() {
            return Err(CoreError::validation("at least one seat is required"));
        }
        let mut distinct = seat_ids.to_vec();
        distinct.sort();
        distinct.dedup();
        if distinct.len() != seat_ids.len() {
            return Err(CoreError::validation("duplicate seats in request"));
        }

        let screening = self
            .screenings
            .get_screening(screening_id)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("screening {screening_id}")))?;
        let layout = self
            .layouts
            .get_layout(screening.layout_id)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("seat layout {}", screening.layout_id)))?;

        let unknown = layout.unknown_seats(seat_ids);
        if !unknown.is_empty() {
            return Err(CoreError::validation(format!(
                "seats not in screening layout: {}",
                join_ids(&unknown)
            )));
        }

        let sold = self.sold.sold_seats(screening_id, seat_ids).await?;
        if !sold.is_empty() {
            return Err(CoreError::conflict(format!(
                "seats already sold: {}",
                join_ids(&sold)
            )));
        }

        let reserved = self
            .reservations
            .active_reservations_for_seats(screening_id, seat_ids)
            .await?;
        if !reserved.is_empty() {
            let seats: Vec<Uuid> = reserved.iter().map(|r| r.seat_id).collect();
            return Err(CoreError::conflict(format!(
                "seats already reserved: {}",
                join_ids(&seats)
            )));
        }

        let now = self.clock.now();
        let ttl = match ttl_seconds {
            Some(ttl) if ttl > 0 => ttl,
            Some(_) => return Err(CoreError::validation("ttl must be positive")),
            None => self
                .settings
                .get_int(keys::HOLD_DEFAULT_TTL_SECONDS)
                .await?
                .unwrap_or(defaults::HOLD_DEFAULT_TTL_SECONDS),
        };

        // Holds never outlive the reservation cutoff.
        let expires_at = (now + Duration::seconds(ttl)).min(screening.booking_deadline());
        if expires_at <= now {
            return Err(CoreError::conflict(
                "booking window for this screening has closed",
            ));
        }

        let holds: Vec<SeatHold> = seat_ids
            .iter()
            .map(|&seat_id| SeatHold {
                id: Uuid::new_v4(),
                screening_id,
                seat_id,
                client_token: client_token.to_string(),
                user_id,
                created_at: now,
                last_heartbeat_at: now,
                expires_at,
            })
            .collect();

        // The repository re-checks active-hold uniqueness under its own
        // serialization; a losing racer gets the Conflict from there.
        let inserted = self.holds.insert_active_holds(holds).await?;
        info!(
            %screening_id,
            seats = inserted.len(),
            %expires_at,
            "seat holds created"
        );
        Ok(inserted)
    }

    pub async fn extend_hold(
        &self,
        hold_id: Uuid,
        client_token: &str,
        user_id: Option<Uuid>,
    ) -> CoreResult<SeatHold> {
        let hold = self
            .holds
            .get_hold(hold_id)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("hold {hold_id}")))?;
        if !hold.is_owned_by(client_token, user_id) {
            return Err(CoreError::unauthorized("hold belongs to another client"));
        }
        let now = self.clock.now();
        if hold.is_expired(now) {
            return Err(CoreError::conflict(
                "hold has expired; request a new hold instead of extending",
            ));
        }

        let screening = self
            .screenings
            .get_screening(hold.screening_id)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("screening {}", hold.screening_id)))?;

        let extend_seconds = self
            .settings
            .get_int(keys::HOLD_HEARTBEAT_EXTEND_SECONDS)
            .await?
            .unwrap_or(defaults::HOLD_HEARTBEAT_EXTEND_SECONDS);
        let max_extend_minutes = self
            .settings
            .get_int(keys::HOLD_MAX_EXTEND_MINUTES)
            .await?
            .unwrap_or(defaults::HOLD_MAX_EXTEND_MINUTES);

        // Total lifetime is bounded regardless of heartbeat frequency.
        let ceiling = (hold.created_at + Duration::minutes(max_extend_minutes))
            .min(screening.booking_deadline());
        let new_expiry = (now + Duration::seconds(extend_seconds))
            .min(ceiling)
            .max(hold.expires_at);

        debug!(%hold_id, %new_expiry, "hold extended");
        self.holds
            .update_hold_expiry(hold_id, new_expiry, now)
            .await
    }

    /// Returns the released hold so callers can emit events for it.
    pub async fn release_hold(
        &self,
        hold_id: Uuid,
        client_token: &str,
        user_id: Option<Uuid>,
    ) -> CoreResult<SeatHold> {
        let hold = self
            .holds
            .get_hold(hold_id)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("hold {hold_id}")))?;
        if !hold.is_owned_by(client_token, user_id) {
            return Err(CoreError::unauthorized("hold belongs to another client"));
        }
        self.holds.delete_hold(hold_id).await?;
        info!(%hold_id, seat = %hold.seat_id, "seat hold released");
        Ok(hold)
    }

    /// True iff every seat has an active hold owned by the caller.
    pub async fn validate_holds_for_reservation(
        &self,
        screening_id: Uuid,
        seat_ids: &[Uuid],
        client_token: &str,
        user_id: Option<Uuid>,
    ) -> CoreResult<bool> {
        let now = self.clock.now();
        let active = self
            .holds
            .active_holds_for_seats(screening_id, seat_ids, now)
            .await?;
        let all_owned = seat_ids.iter().all(|seat_id| {
            active
                .iter()
                .any(|h| h.seat_id == *seat_id && h.is_owned_by(client_token, user_id))
        });
        Ok(all_owned)
    }

    /// Deletes one batch of expired holds. Callers drain by looping until
    /// a batch comes back smaller than `batch_size`.
    pub async fn cleanup_expired_holds(&self, batch_size: usize) -> CoreResult<usize> {
        let removed = self
            .holds
            .delete_expired(self.clock.now(), batch_size)
            .await?;
        if removed > 0 {
            info!(removed, "expired seat holds swept");
        }
        Ok(removed)
    }
}

pub(crate) fn join_ids(ids: &[Uuid]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
