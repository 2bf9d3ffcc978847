use cinetix_catalog::TicketType;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One requested ticket line. Quantities above 1 are expanded into
/// independently priced unit lines in the response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteItem {
    pub ticket_type: TicketType,
    #[serde(default)]
    pub is_vip_guest: bool,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

impl QuoteItem {
    pub fn new(ticket_type: TicketType) -> Self {
        Self {
            ticket_type,
            is_vip_guest: false,
            quantity: 1,
        }
    }

    pub fn vip_guest(ticket_type: TicketType) -> Self {
        Self {
            ticket_type,
            is_vip_guest: true,
            quantity: 1,
        }
    }

    /// Counts toward the per-request VIP-guest cap.
    pub fn is_vip_guest_unit(&self) -> bool {
        self.is_vip_guest || self.ticket_type == TicketType::VipGuest
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceQuoteRequest {
    pub screening_id: Uuid,
    pub member_id: Option<Uuid>,
    pub items: Vec<QuoteItem>,
}

/// The winning rule for one unit, with its money effect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppliedRule {
    pub code: String,
    pub title: String,
    pub amount_off_cents: i64,
    pub final_price_cents: i64,
    pub details: Option<String>,
}

/// One priced unit (quantity is always 1 in the response).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteLine {
    pub ticket_type: TicketType,
    pub is_vip_guest: bool,
    pub quantity: u32,
    pub base_price_cents: i64,
    pub applied_rule: AppliedRule,
    pub final_price_cents: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceQuoteResponse {
    pub screening_id: Uuid,
    pub lines: Vec<QuoteLine>,
    pub total_before_cents: i64,
    pub total_after_cents: i64,
    pub total_discount_cents: i64,
    /// De-duplicated titles of every rule that priced at least one unit.
    pub applied_rule_titles: Vec<String>,
    pub has_vip_benefits: bool,
    pub has_discounts: bool,
}
