//! Discover routes
//!
//! Each registered source contributes its own routes; handlers bind the raw
//! query string to the source's filter keys and never fail. Upstream errors
//! surface as an empty JSON array.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use tracing::debug;

use explore_core::{resolve_filters, DiscoverMediaSource, DiscoverSource, MediaInfo, PageParams, SourceRegistry};

use super::{AppError, AppResult, AppState};

/// Routes for every source in the registry plus the descriptor listing
pub fn discover_routes(registry: &SourceRegistry) -> Router<AppState> {
    let mut router = Router::new()
        .route("/discover_sources", get(list_sources))
        .route("/discover_sources/{id}", get(get_source));

    for source in registry.sources() {
        for route in source.routes() {
            let source = Arc::clone(&source);
            router = router.route(
                &route.path,
                get(move |Query(raw): Query<HashMap<String, String>>| {
                    let source = Arc::clone(&source);
                    async move { Json(discover(source.as_ref(), &raw).await) }
                }),
            );
        }
    }

    router
}

fn parse_number(raw: &HashMap<String, String>, key: &str) -> Option<u32> {
    raw.get(key).and_then(|v| v.trim().parse().ok())
}

/// Run one discover query from raw request parameters.
///
/// `page` and `count` that fail to parse fall back to defaults; unknown keys
/// are ignored.
pub async fn discover(source: &dyn DiscoverSource, raw: &HashMap<String, String>) -> Vec<MediaInfo> {
    let page = PageParams::new(
        parse_number(raw, "page"),
        parse_number(raw, "count"),
        source.default_count(),
    );
    let filter_params = source.filter_params().await;
    let filters = resolve_filters(raw, &filter_params);

    debug!(
        source = source.id(),
        page = page.page,
        count = page.page_size,
        ?filters,
        "Discover request"
    );

    let items = source.query(&filters, page).await;
    debug!(source = source.id(), results = items.len(), "Discover response");
    items
}

/// The `extra_sources` list the host would receive
pub async fn list_sources(State(state): State<AppState>) -> Json<Vec<DiscoverMediaSource>> {
    let mut extra_sources = None;
    state
        .registry
        .attach(&mut extra_sources, &state.api_prefix, &state.api_token)
        .await;
    Json(extra_sources.unwrap_or_default())
}

/// One source's descriptor
pub async fn get_source(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DiscoverMediaSource>> {
    let source = state
        .registry
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("unknown source '{id}'")))?;

    let descriptor = source
        .descriptor(&state.api_prefix, &state.api_token)
        .await;
    descriptor.validate()?;
    Ok(Json(descriptor))
}
