use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A scheduled showing of a movie in a hall.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Screening {
    pub id: Uuid,
    pub movie_id: Uuid,
    pub hall_id: Uuid,
    pub layout_id: Uuid,
    pub starts_at: DateTime<Utc>,
    pub duration_minutes: i64,
    /// First showing of the movie on a weekday ("ilk seans").
    pub is_first_weekday_show: bool,
    /// Halk Günü override regardless of the configured weekday.
    pub is_special_day: bool,
    /// Per-screening base price override. Unset today; the pricing engine
    /// falls back to the configured base price when this is None.
    pub base_price_cents: Option<i64>,
}

impl Screening {
    /// The T-30 cutoff: reservations expire and holds are clamped to this
    /// instant, 30 minutes before the screening starts.
    pub fn booking_deadline(&self) -> DateTime<Utc> {
        self.starts_at - Duration::minutes(30)
    }

    pub fn has_started(&self, now: DateTime<Utc>) -> bool {
        now >= self.starts_at
    }

    pub fn ends_at(&self) -> DateTime<Utc> {
        self.starts_at + Duration::minutes(self.duration_minutes)
    }
}
