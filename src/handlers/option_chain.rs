use axum::{extract::State, response::Html, Json};
use chrono::Utc;

use crate::{
    error::ChainError,
    models::chain_view::{ChainView, OptionChainResponse},
    services::{option_chain::format_option_chain, page_renderer::render_index_page},
    AppState,
};

/// One fetch and one transform per request; nothing is shared between requests
async fn load_chain_view(state: &AppState) -> Result<ChainView, ChainError> {
    let payload = state.source.fetch_option_chain().await?;
    format_option_chain(&payload)
}

/// Handler for GET /
/// Renders the option-chain dashboard page
pub async fn get_option_chain_page(
    State(state): State<AppState>,
) -> Result<Html<String>, ChainError> {
    let view = load_chain_view(&state).await?;

    tracing::info!(
        "Rendering {} option chain: {} strikes, {}",
        state.source.symbol(),
        view.rows.len(),
        view.summary.comparison
    );

    Ok(Html(render_index_page(
        state.source.symbol(),
        &view,
        Utc::now(),
    )))
}

/// Handler for GET /api/option-chain
/// Same rows and summary as the page, as JSON
pub async fn get_option_chain_json(
    State(state): State<AppState>,
) -> Result<Json<OptionChainResponse>, ChainError> {
    let view = load_chain_view(&state).await?;

    Ok(Json(OptionChainResponse {
        symbol: state.source.symbol().to_string(),
        fetched_at: Utc::now(),
        view,
    }))
}
