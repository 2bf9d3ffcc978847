use cinetix_catalog::TicketType;
use serde::{Deserialize, Serialize};

use crate::models::{AppliedRule, QuoteItem};

pub const BASE_PRICE: &str = "BASE_PRICE";
pub const VIP_MONTHLY_FREE: &str = "VIP_MONTHLY_FREE";
pub const VIP_ADDITIONAL_MOVIE: &str = "VIP_ADDITIONAL_MOVIE";
pub const HALK_GUNU_50: &str = "HALK_GUNU_50";
pub const FIRST_WEEKDAY_50: &str = "FIRST_WEEKDAY_50";
pub const STUDENT_40: &str = "STUDENT_40";
pub const VIP_GUEST_20: &str = "VIP_GUEST_20";

/// Request-scoped pricing facts, computed once per quote and mutated only
/// by the unit loop (free-ticket usage, VIP-guest index). Never shared
/// across requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingContext {
    pub is_vip_member: bool,
    pub vip_free_tickets_used_this_month: u32,
    pub is_halk_gunu: bool,
    pub is_first_weekday_show: bool,
    pub total_vip_guest_items: u32,
    /// Index of the current VIP-guest unit within the request, in request
    /// order. Only the first two get the guest discount.
    pub current_vip_guest_index: u32,
}

impl PricingContext {
    pub fn has_used_monthly_free(&self) -> bool {
        self.vip_free_tickets_used_this_month > 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    VipMonthlyFree,
    VipAdditionalMovie,
    HalkGunu,
    FirstWeekdayShow,
    Student,
    VipGuest,
}

/// A discount rule. `execution_order` is explicit data: the composition
/// pass keys off rule codes and iterates in this order, never in
/// declaration order.
#[derive(Debug, Clone)]
pub struct DiscountRule {
    pub code: &'static str,
    pub title: &'static str,
    pub execution_order: i32,
    pub percent_off: i64,
    kind: RuleKind,
}

impl DiscountRule {
    pub fn is_applicable(&self, ctx: &PricingContext, item: &QuoteItem) -> bool {
        match self.kind {
            RuleKind::VipMonthlyFree => {
                ctx.is_vip_member && !ctx.has_used_monthly_free() && !item.is_vip_guest
            }
            RuleKind::VipAdditionalMovie => {
                ctx.is_vip_member
                    && ctx.has_used_monthly_free()
                    && item.ticket_type == TicketType::Vip
                    && !item.is_vip_guest
            }
            RuleKind::HalkGunu => ctx.is_halk_gunu,
            RuleKind::FirstWeekdayShow => ctx.is_first_weekday_show,
            RuleKind::Student => item.ticket_type == TicketType::Student,
            RuleKind::VipGuest => {
                ctx.is_vip_member && item.is_vip_guest_unit() && ctx.current_vip_guest_index < 2
            }
        }
    }

    pub fn calculate_discount(&self, base_price_cents: i64) -> AppliedRule {
        let amount_off = base_price_cents * self.percent_off / 100;
        AppliedRule {
            code: self.code.to_string(),
            title: self.title.to_string(),
            amount_off_cents: amount_off,
            final_price_cents: base_price_cents - amount_off,
            details: Some(format!("{}% off", self.percent_off)),
        }
    }
}

/// The registry, sorted by execution order. Built once at engine startup.
pub fn default_rules() -> Vec<DiscountRule> {
    let mut rules = vec![
        DiscountRule {
            code: VIP_MONTHLY_FREE,
            title: "VIP Monthly Free Ticket",
            execution_order: 1,
            percent_off: 100,
            kind: RuleKind::VipMonthlyFree,
        },
        DiscountRule {
            code: VIP_ADDITIONAL_MOVIE,
            title: "VIP Additional Movie",
            execution_order: 5,
            percent_off: 50,
            kind: RuleKind::VipAdditionalMovie,
        },
        DiscountRule {
            code: HALK_GUNU_50,
            title: "Halk Günü",
            execution_order: 10,
            percent_off: 50,
            kind: RuleKind::HalkGunu,
        },
        DiscountRule {
            code: FIRST_WEEKDAY_50,
            title: "First Weekday Show",
            execution_order: 11,
            percent_off: 50,
            kind: RuleKind::FirstWeekdayShow,
        },
        DiscountRule {
            code: STUDENT_40,
            title: "Student Discount",
            execution_order: 20,
            percent_off: 40,
            kind: RuleKind::Student,
        },
        DiscountRule {
            code: VIP_GUEST_20,
            title: "VIP Guest Discount",
            execution_order: 21,
            percent_off: 20,
            kind: RuleKind::VipGuest,
        },
    ];
    rules.sort_by_key(|r| r.execution_order);
    rules
}
