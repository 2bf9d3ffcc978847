pub mod events;

pub use events::{
    DomainEvent, ReservationCreatedEvent, SeatHeldEvent, SeatReleasedEvent, TicketsSoldEvent,
};
