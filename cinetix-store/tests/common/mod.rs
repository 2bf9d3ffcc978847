use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use cinetix_booking::{HoldManager, ReservationManager};
use cinetix_core::{Clock, FixedClock, PaymentGateway, TicketCodeGenerator};
use cinetix_pricing::PricingEngine;
use cinetix_sale::SaleOrchestrator;
use cinetix_store::{MemoryStore, MemorySettings, MockPaymentGateway, RandomTicketCodes};

/// Fully wired in-memory core with a pinned clock.
pub struct Stack {
    pub store: MemoryStore,
    pub settings: Arc<MemorySettings>,
    pub gateway: Arc<MockPaymentGateway>,
    pub clock: Arc<FixedClock>,
    pub holds: Arc<HoldManager>,
    pub reservations: Arc<ReservationManager>,
    pub pricing: Arc<PricingEngine>,
    pub sales: Arc<SaleOrchestrator>,
}

/// A Tuesday morning, far from any weekday-discount configuration.
pub fn default_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 9, 8, 10, 0, 0).unwrap()
}

pub fn stack_at(now: DateTime<Utc>) -> Stack {
    let clock = Arc::new(FixedClock::new(now));
    let settings = Arc::new(MemorySettings::new());
    let gateway = Arc::new(MockPaymentGateway::new());
    let store = MemoryStore::new(clock.clone() as Arc<dyn Clock>);
    build(store, settings, gateway, clock, Arc::new(RandomTicketCodes::new()))
}

pub fn build(
    store: MemoryStore,
    settings: Arc<MemorySettings>,
    gateway: Arc<MockPaymentGateway>,
    clock: Arc<FixedClock>,
    codes: Arc<dyn TicketCodeGenerator>,
) -> Stack {
    let holds = Arc::new(HoldManager::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        settings.clone(),
        clock.clone(),
    ));
    let reservations = Arc::new(ReservationManager::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        holds.clone(),
        settings.clone(),
        clock.clone(),
    ));
    let pricing = Arc::new(PricingEngine::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        settings.clone(),
        Arc::new(store.clone()),
        clock.clone(),
    ));
    let sales = Arc::new(SaleOrchestrator::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        pricing.clone(),
        gateway.clone(),
        Arc::new(store.clone()),
        codes,
        Arc::new(store.clone()),
        clock.clone(),
    ));
    Stack {
        store,
        settings,
        gateway,
        clock,
        holds,
        reservations,
        pricing,
        sales,
    }
}

/// Builds an orchestrator over the same store with a caller-supplied
/// gateway, for tests that need to control payment timing.
pub fn sales_with_gateway(stack: &Stack, gateway: Arc<dyn PaymentGateway>) -> Arc<SaleOrchestrator> {
    let store = &stack.store;
    Arc::new(SaleOrchestrator::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        stack.pricing.clone(),
        gateway,
        Arc::new(store.clone()),
        Arc::new(RandomTicketCodes::new()),
        Arc::new(store.clone()),
        stack.clock.clone(),
    ))
}

/// Rebuilds the orchestrator over the same store with a different code
/// generator, for uniqueness-retry tests.
pub fn with_codes(stack: &Stack, codes: Arc<dyn TicketCodeGenerator>) -> Stack {
    build(
        stack.store.clone(),
        stack.settings.clone(),
        stack.gateway.clone(),
        stack.clock.clone(),
        codes,
    )
}
