use std::sync::Arc;

use tokio::sync::broadcast;

use cinetix_booking::{HoldManager, ReservationManager};
use cinetix_pricing::PricingEngine;
use cinetix_sale::SaleOrchestrator;
use cinetix_shared::events::DomainEvent;
use cinetix_store::MemoryStore;

#[derive(Clone)]
pub struct AppState {
    pub store: MemoryStore,
    pub holds: Arc<HoldManager>,
    pub reservations: Arc<ReservationManager>,
    pub pricing: Arc<PricingEngine>,
    pub sales: Arc<SaleOrchestrator>,
    pub sse_tx: broadcast::Sender<DomainEvent>,
}

impl AppState {
    /// Dropped-receiver errors are expected when nobody is streaming.
    pub fn publish(&self, event: DomainEvent) {
        let _ = self.sse_tx.send(event);
    }
}
