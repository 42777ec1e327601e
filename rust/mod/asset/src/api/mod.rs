pub mod asset;
pub mod cpu_spec;
pub mod facility;

use std::sync::Arc;

use axum::{Json, Router};
use serde::Serialize;

use asman_core::ServiceError;

use crate::service::AllocationService;

/// Shared application state.
pub type AppState = Arc<AllocationService>;

/// Build the asset API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_routes())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(facility::routes())
        .merge(cpu_spec::routes())
        .merge(asset::routes())
}

/// Wrap a Result<T, ServiceError> into an API response. Errors render
/// through `ServiceError`'s own `IntoResponse`.
pub(crate) fn ok_json<T: Serialize>(result: Result<T, ServiceError>) -> Result<Json<T>, ServiceError> {
    result.map(Json)
}

pub(crate) fn deleted(result: Result<(), ServiceError>) -> Result<Json<serde_json::Value>, ServiceError> {
    result?;
    Ok(Json(serde_json::json!({"ok": true})))
}
