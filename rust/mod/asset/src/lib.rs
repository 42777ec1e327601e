pub mod api;
pub mod model;
pub mod service;
pub mod store;

use std::sync::Arc;

use axum::Router;
use asman_core::Module;

use service::AllocationService;

/// Asset module: hardware allocation to facilities.
pub struct AssetModule {
    service: Arc<AllocationService>,
}

impl AssetModule {
    pub fn new(service: AllocationService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

impl Module for AssetModule {
    fn name(&self) -> &str {
        "asset"
    }

    fn routes(&self) -> Router {
        api::router(self.service.clone())
    }
}
