pub mod member;
pub mod screening;
pub mod seating;
pub mod types;

pub use member::{Member, VipApproval};
pub use screening::Screening;
pub use seating::{Seat, SeatLayout};
pub use types::{SaleChannel, TicketType};
