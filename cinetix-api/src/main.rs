use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cinetix_api::{app, AppState};
use cinetix_booking::{HoldManager, ReservationManager};
use cinetix_core::{Clock, SystemClock};
use cinetix_pricing::PricingEngine;
use cinetix_sale::SaleOrchestrator;
use cinetix_store::{ConfigSettings, MemoryStore, MockPaymentGateway, RandomTicketCodes};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cinetix_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = cinetix_store::Config::load().expect("Failed to load config");
    tracing::info!("Starting Cinetix API on port {}", config.server.port);

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let settings = Arc::new(ConfigSettings::new(config.business_rules.clone()));
    let store = MemoryStore::new(clock.clone());

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
        Arc::new(MockPaymentGateway::new()),
        Arc::new(store.clone()),
        Arc::new(RandomTicketCodes::new()),
        Arc::new(store.clone()),
        clock.clone(),
    ));

    tokio::spawn(cinetix_api::worker::start_expiry_worker(
        holds.clone(),
        reservations.clone(),
        tokio::time::Duration::from_secs(30),
    ));

    let (sse_tx, _) = tokio::sync::broadcast::channel(100);
    let app_state = AppState {
        store,
        holds,
        reservations,
        pricing,
        sales,
        sse_tx,
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app).await.expect("Server error");
}
