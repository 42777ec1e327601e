use axum::{
    Router,
    extract::{Path, State},
    routing::get,
    Json,
};
use serde::Deserialize;

use asman_core::ServiceError;

use crate::model::{CpuSpecification, SpecFields};
use super::{AppState, deleted, ok_json};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/cpu-specs", get(list_specs).post(register_spec))
        .route("/cpu-specs/{id}", get(get_spec).put(save_spec).delete(delete_spec))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SaveSpecBody {
    #[serde(default)]
    manufacturer: String,
    #[serde(default)]
    model: String,
    processor: String,
    memory: String,
    #[serde(alias = "hardDisk")]
    storage: String,
    purchase_date: Option<String>,
    supplier: Option<String>,
}

async fn list_specs(
    State(svc): State<AppState>,
) -> Result<Json<Vec<CpuSpecification>>, ServiceError> {
    ok_json(svc.list_specifications())
}

async fn register_spec(
    State(svc): State<AppState>,
    Json(fields): Json<SpecFields>,
) -> Result<Json<CpuSpecification>, ServiceError> {
    ok_json(svc.register_specification(fields))
}

async fn get_spec(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CpuSpecification>, ServiceError> {
    ok_json(svc.get_specification(&id))
}

async fn save_spec(
    State(svc): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<SaveSpecBody>,
) -> Result<Json<CpuSpecification>, ServiceError> {
    let spec = CpuSpecification {
        id: String::new(),
        manufacturer: body.manufacturer,
        model: body.model,
        processor: body.processor,
        memory: body.memory,
        storage: body.storage,
        purchase_date: body.purchase_date,
        supplier: body.supplier,
        create_at: None,
        update_at: None,
    };
    ok_json(svc.save_specification(&id, spec))
}

async fn delete_spec(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    deleted(svc.delete_specification(&id))
}
