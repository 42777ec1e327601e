use axum::{
    Router,
    extract::{Path, Query, State},
    routing::get,
    Json,
};
use serde::Deserialize;

use asman_core::ServiceError;

use crate::model::{County, Facility};
use super::{AppState, ok_json};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/facilities", get(list_facilities))
        .route("/facilities/search", get(search_facilities))
        .route("/facilities/{id}", get(get_facility))
        .route("/counties", get(list_counties))
}

#[derive(Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
}

async fn list_facilities(State(svc): State<AppState>) -> Result<Json<Vec<Facility>>, ServiceError> {
    ok_json(svc.list_facilities())
}

async fn search_facilities(
    State(svc): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Facility>>, ServiceError> {
    ok_json(svc.search_facilities(&query.q))
}

async fn get_facility(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Facility>, ServiceError> {
    ok_json(svc.get_facility(&id))
}

async fn list_counties(State(svc): State<AppState>) -> Result<Json<Vec<County>>, ServiceError> {
    ok_json(svc.list_counties())
}
