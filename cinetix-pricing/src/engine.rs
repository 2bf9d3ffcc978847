use std::sync::Arc;

use cinetix_core::settings::{defaults, keys};
use cinetix_core::{
    Clock, CoreError, CoreResult, MemberRepository, ScreeningRepository, SettingsReader,
    VipUsageService,
};
use tracing::debug;

use crate::models::{AppliedRule, PriceQuoteRequest, PriceQuoteResponse, QuoteItem, QuoteLine};
use crate::rules::{self, DiscountRule, PricingContext};

/// Computes quotes by evaluating the discount registry against a
/// request-scoped context. Pure with respect to storage: nothing here is
/// persisted.
pub struct PricingEngine {
    screenings: Arc<dyn ScreeningRepository>,
    members: Arc<dyn MemberRepository>,
    settings: Arc<dyn SettingsReader>,
    vip_usage: Arc<dyn VipUsageService>,
    clock: Arc<dyn Clock>,
    rules: Vec<DiscountRule>,
}

impl PricingEngine {
    pub fn new(
        screenings: Arc<dyn ScreeningRepository>,
        members: Arc<dyn MemberRepository>,
        settings: Arc<dyn SettingsReader>,
        vip_usage: Arc<dyn VipUsageService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            screenings,
            members,
            settings,
            vip_usage,
            clock,
            rules: rules::default_rules(),
        }
    }

    pub async fn calculate_quote(
        &self,
        request: &PriceQuoteRequest,
    ) -> CoreResult<PriceQuoteResponse> {
        if request.items.is_empty() {
            return Err(CoreError::validation("quote request has no items"));
        }
        let screening = self
            .screenings
            .get_screening(request.screening_id)
            .await?
            .ok_or_else(|| {
                CoreError::validation(format!("screening {} not found", request.screening_id))
            })?;

        // Member lookup is tolerant: an unknown id prices as anonymous.
        let member = match request.member_id {
            Some(id) => self.members.get_member(id).await?,
            None => None,
        };

        let base_price_cents = match screening.base_price_cents {
            Some(cents) => cents,
            None => self
                .settings
                .get_cents(keys::BASE_TICKET_PRICE)
                .await?
                .unwrap_or(defaults::BASE_TICKET_PRICE_CENTS),
        };

        let is_vip_member = member.as_ref().map(|m| m.is_active_vip()).unwrap_or(false);
        let vip_free_used = match (&member, is_vip_member) {
            (Some(m), true) => self.vip_usage.vip_free_tickets_used_this_month(m.id).await?,
            _ => 0,
        };
        let halk_gunu_day = self.settings.get_string(keys::HALK_GUNU).await?;
        let today = self.clock.now().format("%A").to_string();
        let is_halk_gunu = screening.is_special_day
            || halk_gunu_day
                .map(|day| day.eq_ignore_ascii_case(&today))
                .unwrap_or(false);

        let total_vip_guest_items: u32 = request
            .items
            .iter()
            .filter(|i| i.is_vip_guest_unit())
            .map(|i| i.quantity)
            .sum();

        let mut ctx = PricingContext {
            is_vip_member,
            vip_free_tickets_used_this_month: vip_free_used,
            is_halk_gunu,
            is_first_weekday_show: screening.is_first_weekday_show,
            total_vip_guest_items,
            current_vip_guest_index: 0,
        };

        let mut lines = Vec::new();
        for item in &request.items {
            // Each unit is priced independently, strictly in request order.
            for _ in 0..item.quantity.max(1) {
                let unit = QuoteItem {
                    ticket_type: item.ticket_type,
                    is_vip_guest: item.is_vip_guest,
                    quantity: 1,
                };
                let applied = self.price_unit(&ctx, &unit, base_price_cents);

                if applied.code == rules::VIP_MONTHLY_FREE {
                    // Only the first eligible unit in the request rides free.
                    ctx.vip_free_tickets_used_this_month += 1;
                }
                if unit.is_vip_guest_unit() {
                    ctx.current_vip_guest_index += 1;
                }

                debug!(
                    rule = %applied.code,
                    final_cents = applied.final_price_cents,
                    "priced unit"
                );
                lines.push(QuoteLine {
                    ticket_type: unit.ticket_type,
                    is_vip_guest: unit.is_vip_guest,
                    quantity: 1,
                    base_price_cents,
                    final_price_cents: applied.final_price_cents,
                    applied_rule: applied,
                });
            }
        }

        Ok(Self::summarize(request.screening_id, lines))
    }

    /// Composition: monthly-free overrides everything, the additional-movie
    /// rule overrides the rest, and the remainder compete on strictly
    /// largest amount off (priority order breaks ties).
    fn price_unit(&self, ctx: &PricingContext, item: &QuoteItem, base: i64) -> AppliedRule {
        let applicable: Vec<&DiscountRule> = self
            .rules
            .iter()
            .filter(|r| r.is_applicable(ctx, item))
            .collect();

        if applicable.is_empty() {
            return AppliedRule {
                code: rules::BASE_PRICE.to_string(),
                title: "Base Price".to_string(),
                amount_off_cents: 0,
                final_price_cents: base,
                details: None,
            };
        }
        if let Some(rule) = applicable.iter().find(|r| r.code == rules::VIP_MONTHLY_FREE) {
            return rule.calculate_discount(base);
        }
        if let Some(rule) = applicable
            .iter()
            .find(|r| r.code == rules::VIP_ADDITIONAL_MOVIE)
        {
            return rule.calculate_discount(base);
        }

        let mut best = applicable[0].calculate_discount(base);
        for rule in &applicable[1..] {
            let candidate = rule.calculate_discount(base);
            if candidate.amount_off_cents > best.amount_off_cents {
                best = candidate;
            }
        }
        best
    }

    fn summarize(screening_id: uuid::Uuid, lines: Vec<QuoteLine>) -> PriceQuoteResponse {
        let total_before: i64 = lines.iter().map(|l| l.base_price_cents).sum();
        let total_after: i64 = lines.iter().map(|l| l.final_price_cents).sum();

        let mut titles: Vec<String> = Vec::new();
        for line in &lines {
            if line.applied_rule.amount_off_cents > 0
                && !titles.contains(&line.applied_rule.title)
            {
                titles.push(line.applied_rule.title.clone());
            }
        }
        let has_vip_benefits = lines
            .iter()
            .any(|l| l.applied_rule.code.starts_with("VIP_"));

        PriceQuoteResponse {
            screening_id,
            total_before_cents: total_before,
            total_after_cents: total_after,
            total_discount_cents: total_before - total_after,
            applied_rule_titles: titles,
            has_vip_benefits,
            has_discounts: total_before > total_after,
            lines,
        }
    }
}
