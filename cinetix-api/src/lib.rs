use axum::{http::Method, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod error;
pub mod holds;
pub mod quotes;
pub mod reservations;
pub mod sales;
pub mod state;
pub mod streams;
pub mod worker;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::USER_AGENT,
        ]);

    Router::new()
        .merge(holds::routes())
        .merge(reservations::routes())
        .merge(quotes::routes())
        .merge(sales::routes())
        .merge(streams::routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
