use chrono::{DateTime, Utc};
use cinetix_catalog::{SaleChannel, TicketType};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The permanent claim on a seat for a screening. Unique per
/// (screening, seat) and per ticket_code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: Uuid,
    pub screening_id: Uuid,
    pub seat_id: Uuid,
    pub ticket_type: TicketType,
    pub channel: SaleChannel,
    pub price_cents: i64,
    pub payment_id: Uuid,
    pub sold_at: DateTime<Utc>,
    /// Short human-shareable code, e.g. "AB12-34CD".
    pub ticket_code: String,
    /// Serialized pricing breakdown, kept for audit.
    pub applied_pricing_json: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Succeeded,
    Failed,
}

/// One row per sale transaction; amount is the quote's total-after.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub amount_cents: i64,
    pub method: String,
    pub status: PaymentStatus,
    pub external_reference: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One seat in a sale request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleItem {
    pub seat_id: Uuid,
    #[serde(default)]
    pub ticket_type: TicketType,
    #[serde(default)]
    pub is_vip_guest: bool,
}

/// Sale request. Exactly one of the two modes applies: reservation-based
/// (`reservation_id` set, seats come from the reservation rows) or direct
/// (`items` lists the seats).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellTicketsRequest {
    pub screening_id: Uuid,
    pub reservation_id: Option<Uuid>,
    pub client_token: Option<String>,
    pub member_id: Option<Uuid>,
    pub channel: SaleChannel,
    pub payment_method: String,
    pub idempotency_key: Option<String>,
    #[serde(default)]
    pub items: Vec<SaleItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoldTicket {
    pub ticket_id: Uuid,
    pub seat_id: Uuid,
    pub ticket_code: String,
    pub price_cents: i64,
    pub applied_rule_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellTicketsResponse {
    pub payment_status: PaymentStatus,
    pub payment_id: Option<Uuid>,
    pub total_before_cents: i64,
    pub total_after_cents: i64,
    /// Gateway decline reason when payment_status is Failed.
    pub payment_error: Option<String>,
    pub tickets: Vec<SoldTicket>,
}
