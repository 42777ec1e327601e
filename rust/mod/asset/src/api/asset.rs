use axum::{
    Router,
    extract::{Path, Query, State},
    routing::get,
    Json,
};
use serde::Deserialize;

use asman_core::ServiceError;

use crate::model::{AllocationView, AssetEntry};
use super::{AppState, deleted, ok_json};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/assets", get(list_assets).post(create_asset))
        .route("/assets/search", get(search_assets))
        .route("/assets/{id}", get(get_asset).put(update_asset).delete(delete_asset))
        .route("/models/suggest", get(suggest_models))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListQuery {
    facility_id: Option<String>,
}

#[derive(Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
}

#[derive(Deserialize)]
struct SuggestQuery {
    #[serde(rename = "type")]
    field_type: String,
    #[serde(default)]
    query: String,
}

async fn list_assets(
    State(svc): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<AllocationView>>, ServiceError> {
    let records = svc.list_assets(query.facility_id.as_deref())?;
    ok_json(svc.describe_all(records))
}

async fn create_asset(
    State(svc): State<AppState>,
    Json(entry): Json<AssetEntry>,
) -> Result<Json<AllocationView>, ServiceError> {
    let record = svc.create_allocation(entry.into_request()?)?;
    ok_json(svc.describe(record))
}

async fn search_assets(
    State(svc): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<AllocationView>>, ServiceError> {
    let records = svc.search_assets(&query.q)?;
    ok_json(svc.describe_all(records))
}

async fn get_asset(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AllocationView>, ServiceError> {
    let record = svc.get_allocation(&id)?;
    ok_json(svc.describe(record))
}

async fn update_asset(
    State(svc): State<AppState>,
    Path(id): Path<String>,
    Json(entry): Json<AssetEntry>,
) -> Result<Json<AllocationView>, ServiceError> {
    let record = svc.update_allocation(&id, entry.into_request()?)?;
    ok_json(svc.describe(record))
}

async fn delete_asset(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    deleted(svc.delete_allocation(&id))
}

async fn suggest_models(
    State(svc): State<AppState>,
    Query(query): Query<SuggestQuery>,
) -> Result<Json<Vec<String>>, ServiceError> {
    ok_json(svc.suggest_model_values(&query.field_type, &query.query))
}
