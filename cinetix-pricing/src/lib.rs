pub mod engine;
pub mod models;
pub mod rules;

pub use engine::PricingEngine;
pub use models::{AppliedRule, PriceQuoteRequest, PriceQuoteResponse, QuoteItem, QuoteLine};
pub use rules::{default_rules, DiscountRule, PricingContext};
