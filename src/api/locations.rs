use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, AppState, types::NamedRef};

#[derive(Deserialize)]
pub struct StatesQuery {
    pub country_id: i32,
}

#[derive(Deserialize)]
pub struct CitiesQuery {
    pub state_id: i32,
}

/// GET /locations/countries
pub async fn list_countries(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<NamedRef>>, ApiError> {
    let rows = state.store().list_countries().await?;
    Ok(Json(
        rows.into_iter()
            .map(|c| NamedRef { id: c.id, name: c.name })
            .collect(),
    ))
}

/// GET /locations/states?country_id=
pub async fn list_states(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StatesQuery>,
) -> Result<Json<Vec<NamedRef>>, ApiError> {
    let rows = state.store().list_states(query.country_id).await?;
    Ok(Json(
        rows.into_iter()
            .map(|s| NamedRef { id: s.id, name: s.name })
            .collect(),
    ))
}

/// GET /locations/cities?state_id=
pub async fn list_cities(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CitiesQuery>,
) -> Result<Json<Vec<NamedRef>>, ApiError> {
    let rows = state.store().list_cities(query.state_id).await?;
    Ok(Json(
        rows.into_iter()
            .map(|c| NamedRef { id: c.id, name: c.name })
            .collect(),
    ))
}
