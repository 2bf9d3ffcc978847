pub mod holds;
pub mod models;
pub mod repository;
pub mod reservations;

pub use holds::HoldManager;
pub use models::{Reservation, ReservationStatus, ReservationView, SeatHold};
pub use repository::{ReservationRepository, SeatHoldRepository};
pub use reservations::ReservationManager;
