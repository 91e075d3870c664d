// src/lib.rs

use std::sync::Arc;

use axum::{http::Method, routing::get, Router};
use services::nse::OptionChainSource;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn OptionChainSource>,
}

impl AppState {
    pub fn new(source: impl OptionChainSource + 'static) -> Self {
        Self {
            source: Arc::new(source),
        }
    }
}

pub mod config;
pub mod error;

pub mod services {
    pub mod nse;
    pub mod option_chain;
    pub mod page_renderer;
}

pub mod models;
pub mod handlers;

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET])
        .allow_origin(Any);

    Router::new()
        .route("/", get(handlers::option_chain::get_option_chain_page))
        .route(
            "/api/option-chain",
            get(handlers::option_chain::get_option_chain_json),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
