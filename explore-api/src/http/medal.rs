//! Medal wall routes
//!
//! `GET /medals` aggregates every configured site and never fails;
//! `GET /medals/{site}` reports an upstream failure as 502.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;

use explore_media_providers::medal::{site_options, Medal, MedalWall};

use super::{AppError, AppResult, AppState};

#[derive(Debug, Default, Deserialize)]
pub struct MedalQuery {
    /// Keep only medals whose sale window contains the current time
    #[serde(default)]
    pub on_sale: bool,
}

pub fn medal_routes() -> Router<AppState> {
    Router::new()
        .route("/medal_sites", get(list_sites))
        .route("/medals", get(list_medals))
        .route("/medals/{site}", get(site_medals))
}

fn wall(state: &AppState) -> AppResult<&Arc<MedalWall>> {
    state
        .medal_wall
        .as_ref()
        .ok_or_else(|| AppError::NotFound("medal wall is disabled".to_string()))
}

fn filter(medals: Vec<Medal>, query: &MedalQuery) -> Vec<Medal> {
    if query.on_sale {
        medals.into_iter().filter(Medal::on_sale_now).collect()
    } else {
        medals
    }
}

/// `GET /medal_sites`
async fn list_sites(State(state): State<AppState>) -> AppResult<Json<Vec<Value>>> {
    Ok(Json(site_options(wall(&state)?.sites())))
}

/// `GET /medals`
async fn list_medals(
    State(state): State<AppState>,
    Query(query): Query<MedalQuery>,
) -> AppResult<Json<Vec<Medal>>> {
    let medals = wall(&state)?.all_medals().await;
    Ok(Json(filter(medals, &query)))
}

/// `GET /medals/{site}`
async fn site_medals(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<MedalQuery>,
) -> AppResult<Json<Vec<Medal>>> {
    let wall = wall(&state)?;
    let site = wall
        .site(&name)
        .ok_or_else(|| AppError::NotFound(format!("unknown site '{name}'")))?;
    let medals = wall
        .site_medals(site)
        .await
        .map_err(explore_core::Error::from)?;
    Ok(Json(filter(medals, &query)))
}
