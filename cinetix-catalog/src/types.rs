use serde::{Deserialize, Serialize};

/// Ticket classes sold at the box office and online.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketType {
    Full,
    Student,
    Vip,
    VipGuest,
}

impl Default for TicketType {
    fn default() -> Self {
        TicketType::Full
    }
}

/// Where the sale originated. BoxOffice sales are staff-operated and may
/// override seat holds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SaleChannel {
    Online,
    BoxOffice,
}

impl SaleChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaleChannel::Online => "ONLINE",
            SaleChannel::BoxOffice => "BOX_OFFICE",
        }
    }
}
