use std::sync::Arc;

use chrono::Duration;
use tracing::{info, warn};
use uuid::Uuid;

use cinetix_core::settings::{defaults, keys};
use cinetix_core::{
    Clock, CoreError, CoreResult, MemberRepository, ScreeningRepository, SeatLayoutRepository,
    SettingsReader,
};

use crate::holds::{join_ids, HoldManager};
use crate::models::{Reservation, ReservationStatus, ReservationView};
use crate::repository::ReservationRepository;

const MAX_SEATS_PER_RESERVATION: usize = 10;

/// Converts validated holds into pending reservations and expires the ones
/// that miss their T-30 deadline.
pub struct ReservationManager {
    screenings: Arc<dyn ScreeningRepository>,
    layouts: Arc<dyn SeatLayoutRepository>,
    members: Arc<dyn MemberRepository>,
    reservations: Arc<dyn ReservationRepository>,
    hold_manager: Arc<HoldManager>,
    settings: Arc<dyn SettingsReader>,
    clock: Arc<dyn Clock>,
}

impl ReservationManager {
    pub fn new(
        screenings: Arc<dyn ScreeningRepository>,
        layouts: Arc<dyn SeatLayoutRepository>,
        members: Arc<dyn MemberRepository>,
        reservations: Arc<dyn ReservationRepository>,
        hold_manager: Arc<HoldManager>,
        settings: Arc<dyn SettingsReader>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            screenings,
            layouts,
            members,
            reservations,
            hold_manager,
            settings,
            clock,
        }
    }

    pub async fn create_reservation(
        &self,
        screening_id: Uuid,
        seat_ids: &[Uuid],
        client_token: &str,
        member_id: Option<Uuid>,
    ) -> CoreResult<Vec<ReservationView>> {
        if client_token.trim().is_empty() {
            return Err(CoreError::validation("client token is required"));
        }
        if seat_ids.is_empty() {
            return Err(CoreError::validation("at least one seat is required"));
        }
        if seat_ids.len() > MAX_SEATS_PER_RESERVATION {
            return Err(CoreError::validation(format!(
                "at most {MAX_SEATS_PER_RESERVATION} seats per reservation"
            )));
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

        let now = self.clock.now();
        self.check_advance_window(&screening, member_id, now).await?;
        self.check_sales_cutoff(&screening, now).await?;

        let held = self
            .hold_manager
            .validate_holds_for_reservation(screening_id, seat_ids, client_token, member_id)
            .await?;
        if !held {
            return Err(CoreError::conflict(
                "all seats must be held by the requesting client before reserving",
            ));
        }

        // The whole batch shares one deadline and one group id.
        let expires_at = screening.booking_deadline();
        let group_id = Uuid::new_v4();
        let rows: Vec<Reservation> = seat_ids
            .iter()
            .map(|&seat_id| Reservation {
                id: Uuid::new_v4(),
                group_id,
                screening_id,
                seat_id,
                member_id,
                status: ReservationStatus::Pending,
                expires_at,
                created_at: now,
            })
            .collect();

        self.reservations
            .insert_pending_and_consume_holds(rows.clone(), client_token, member_id)
            .await?;
        info!(%screening_id, %group_id, seats = rows.len(), "reservation created");

        let views = rows
            .into_iter()
            .map(|r| {
                let seat = layout.seat(r.seat_id).ok_or_else(|| {
                    CoreError::internal(format!("seat {} vanished from layout", r.seat_id))
                })?;
                Ok(ReservationView {
                    id: r.id,
                    group_id: r.group_id,
                    screening_id: r.screening_id,
                    seat_id: r.seat_id,
                    seat_label: seat.label.clone(),
                    row: seat.row,
                    col: seat.col,
                    status: r.status,
                    expires_at: r.expires_at,
                })
            })
            .collect::<CoreResult<Vec<_>>>()?;
        Ok(views)
    }

    async fn check_advance_window(
        &self,
        screening: &cinetix_catalog::Screening,
        member_id: Option<Uuid>,
        now: chrono::DateTime<chrono::Utc>,
    ) -> CoreResult<()> {
        let days_until = (screening.starts_at.date_naive() - now.date_naive()).num_days();

        let is_active_vip = match member_id {
            Some(id) => self
                .members
                .get_member(id)
                .await?
                .map(|m| m.is_active_vip())
                .unwrap_or(false),
            None => false,
        };

        let (limit, member_class) = if is_active_vip {
            (
                self.settings
                    .get_int(keys::VIP_ADVANCE_BOOKING_DAYS)
                    .await?
                    .unwrap_or(defaults::VIP_ADVANCE_BOOKING_DAYS),
                "VIP",
            )
        } else {
            (
                self.settings
                    .get_int(keys::REGULAR_ADVANCE_BOOKING_DAYS)
                    .await?
                    .unwrap_or(defaults::REGULAR_ADVANCE_BOOKING_DAYS),
                "regular",
            )
        };

        if days_until > limit {
            return Err(CoreError::policy(format!(
                "{member_class} members may reserve at most {limit} days in advance \
                 (screening is {days_until} days away)"
            )));
        }
        Ok(())
    }

    /// Last-minute sales cutoff, off unless configured.
    async fn check_sales_cutoff(
        &self,
        screening: &cinetix_catalog::Screening,
        now: chrono::DateTime<chrono::Utc>,
    ) -> CoreResult<()> {
        if let Some(minutes) = self
            .settings
            .get_int(keys::RESERVATION_CUTOFF_MINUTES)
            .await?
        {
            if now >= screening.starts_at - Duration::minutes(minutes) {
                return Err(CoreError::conflict(format!(
                    "reservations close {minutes} minutes before the screening"
                )));
            }
        }
        Ok(())
    }

    /// Periodic sweep: Pending past deadline becomes Expired. Per-row
    /// failures are logged and skipped so one bad row cannot wedge the
    /// sweep.
    pub async fn expire_reservations(&self) -> CoreResult<usize> {
        let now = self.clock.now();
        let expired = self.reservations.pending_expired(now).await?;
        let mut count = 0;
        for reservation in expired {
            match self
                .reservations
                .update_reservation_status(reservation.id, ReservationStatus::Expired)
                .await
            {
                Ok(()) => count += 1,
                Err(err) => {
                    warn!(reservation = %reservation.id, %err, "failed to expire reservation");
                }
            }
        }
        if count > 0 {
            info!(count, "pending reservations expired");
        }
        Ok(count)
    }
}
