use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single seat position within a hall layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seat {
    pub id: Uuid,
    /// Human-facing label, e.g. "D7".
    pub label: String,
    pub row: i32,
    pub col: i32,
}

/// The active seat map for a hall. Screenings reference a layout by id so
/// a hall can be re-seated without touching historical screenings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatLayout {
    pub id: Uuid,
    pub hall_id: Uuid,
    pub is_active: bool,
    pub seats: Vec<Seat>,
}

impl SeatLayout {
    pub fn seat(&self, seat_id: Uuid) -> Option<&Seat> {
        self.seats.iter().find(|s| s.id == seat_id)
    }

    pub fn contains_seat(&self, seat_id: Uuid) -> bool {
        self.seat(seat_id).is_some()
    }

    /// Seat ids from `requested` that do not exist in this layout.
    pub fn unknown_seats(&self, requested: &[Uuid]) -> Vec<Uuid> {
        requested
            .iter()
            .copied()
            .filter(|id| !self.contains_seat(*id))
            .collect()
    }
}
