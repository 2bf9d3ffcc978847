use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SeatHeldEvent {
    pub screening_id: Uuid,
    pub seat_id: Uuid,
    pub hold_id: Uuid,
    pub held_at: i64,
    pub expires_at: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SeatReleasedEvent {
    pub screening_id: Uuid,
    pub seat_id: Uuid,
    pub hold_id: Uuid,
    pub released_at: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ReservationCreatedEvent {
    pub group_id: Uuid,
    pub screening_id: Uuid,
    pub seat_ids: Vec<Uuid>,
    pub expires_at: i64,
    pub timestamp: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TicketsSoldEvent {
    pub screening_id: Uuid,
    pub seat_ids: Vec<Uuid>,
    pub payment_id: Uuid,
    pub total_cents: i64,
    pub timestamp: i64,
}

/// Envelope broadcast to in-process subscribers (SSE, projections).
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DomainEvent {
    SeatHeld(SeatHeldEvent),
    SeatReleased(SeatReleasedEvent),
    ReservationCreated(ReservationCreatedEvent),
    TicketsSold(TicketsSoldEvent),
}

impl DomainEvent {
    pub fn screening_id(&self) -> Uuid {
        match self {
            DomainEvent::SeatHeld(e) => e.screening_id,
            DomainEvent::SeatReleased(e) => e.screening_id,
            DomainEvent::ReservationCreated(e) => e.screening_id,
            DomainEvent::TicketsSold(e) => e.screening_id,
        }
    }

    pub fn event_name(&self) -> &'static str {
        match self {
            DomainEvent::SeatHeld(_) => "seat_held",
            DomainEvent::SeatReleased(_) => "seat_released",
            DomainEvent::ReservationCreated(_) => "reservation_created",
            DomainEvent::TicketsSold(_) => "tickets_sold",
        }
    }
}
