use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A temporary exclusive claim on one seat for one screening. Expiry is a
/// query predicate, not a persisted state: an expired hold simply stops
/// counting as active until the sweep deletes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatHold {
    pub id: Uuid,
    pub screening_id: Uuid,
    pub seat_id: Uuid,
    /// Opaque browser/session token of the holder.
    pub client_token: String,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub last_heartbeat_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SeatHold {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Token match, or a matching authenticated user id.
    pub fn is_owned_by(&self, client_token: &str, user_id: Option<Uuid>) -> bool {
        if self.client_token == client_token {
            return true;
        }
        matches!((self.user_id, user_id), (Some(a), Some(b)) if a == b)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Expired,
    Canceled,
    Completed,
}

impl ReservationStatus {
    /// Statuses a sale may still consume.
    pub fn is_sellable(&self) -> bool {
        matches!(self, ReservationStatus::Pending | ReservationStatus::Confirmed)
    }
}

/// A durable intent-to-purchase for one seat. Rows created in the same
/// request share `group_id`; the sale path addresses the batch by it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Uuid,
    pub group_id: Uuid,
    pub screening_id: Uuid,
    pub seat_id: Uuid,
    pub member_id: Option<Uuid>,
    pub status: ReservationStatus,
    /// Always the screening's T-30 deadline, fixed at creation.
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Reservation enriched with seat geometry for client display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationView {
    pub id: Uuid,
    pub group_id: Uuid,
    pub screening_id: Uuid,
    pub seat_id: Uuid,
    pub seat_label: String,
    pub row: i32,
    pub col: i32,
    pub status: ReservationStatus,
    pub expires_at: DateTime<Utc>,
}
