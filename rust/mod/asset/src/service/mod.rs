pub mod allocation;
pub mod query;
pub mod spec;

use std::sync::Arc;

use tracing::warn;

use asman_core::ServiceError;
use asman_sql::SQLStore;

use crate::model::{AllocationRequest, CpuIdentity, CpuSpecification, Facility, SerialField};
use crate::store::schema::init_schema;
use crate::store::{
    AssetRecordStore, FacilityDirectory, SpecificationRegistry, SqlAssetStore,
    SqlFacilityDirectory, SqlSpecRegistry,
};

/// Validates and persists allocations against the injected stores.
///
/// Holds no per-request state; every operation is a self-contained
/// workflow that aborts at the first failing step.
pub struct AllocationService {
    pub(crate) facilities: Arc<dyn FacilityDirectory>,
    pub(crate) specs: Arc<dyn SpecificationRegistry>,
    pub(crate) assets: Arc<dyn AssetRecordStore>,
}

impl AllocationService {
    pub fn new(
        facilities: Arc<dyn FacilityDirectory>,
        specs: Arc<dyn SpecificationRegistry>,
        assets: Arc<dyn AssetRecordStore>,
    ) -> Self {
        Self { facilities, specs, assets }
    }

    /// Build the service over one SQL database, creating the schema if
    /// needed.
    pub fn with_sql(sql: Arc<dyn SQLStore>) -> Result<Self, ServiceError> {
        init_schema(sql.as_ref())?;
        Ok(Self::new(
            Arc::new(SqlFacilityDirectory::new(sql.clone())),
            Arc::new(SqlSpecRegistry::new(sql.clone())),
            Arc::new(SqlAssetStore::new(sql)),
        ))
    }

    // ── Workflow steps shared by create and update ──

    pub(crate) fn require_facility(&self, id: &str) -> Result<Facility, ServiceError> {
        self.facilities
            .get_by_id(id)?
            .ok_or_else(|| ServiceError::not_found("facility", id))
    }

    /// Turn a request's CPU identity into a canonical specification.
    pub(crate) fn resolve_cpu(&self, cpu: &CpuIdentity) -> Result<CpuSpecification, ServiceError> {
        match cpu {
            CpuIdentity::Normalized(id) => self
                .specs
                .get_by_id(id)?
                .ok_or_else(|| ServiceError::not_found("cpuSpec", id.as_str())),
            CpuIdentity::Raw(fields) => self.specs.resolve_or_create(fields),
        }
    }

    /// Check CPU, monitor and UPS serials in that order, stopping at the
    /// first one another record already holds. Blank optional serials are
    /// skipped. `exclude` is the id of the record being updated.
    pub(crate) fn check_serials(
        &self,
        request: &AllocationRequest,
        exclude: Option<&str>,
    ) -> Result<(), ServiceError> {
        let candidates = [
            (SerialField::Cpu, Some(request.cpu_serial.as_str())),
            (SerialField::Monitor, request.monitor_serial.as_deref()),
            (SerialField::Ups, request.ups_serial.as_deref()),
        ];

        for (field, value) in candidates {
            let Some(serial) = value.filter(|s| !s.is_empty()) else {
                continue;
            };
            let taken = match exclude {
                Some(id) => self.assets.exists_by_serial_excluding(field, serial, id)?,
                None => self.assets.exists_by_serial(field, serial)?,
            };
            if taken {
                warn!("{} '{}' already allocated", field.field_name(), serial);
                return Err(ServiceError::conflict(field.field_name(), serial));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use asman_sql::{SQLStore, SqliteStore};

    use super::AllocationService;
    use crate::model::{CpuSpecification, Facility, SpecFields};
    use crate::store::{SpecificationRegistry, SqlFacilityDirectory, SqlSpecRegistry};

    /// A service over a fresh in-memory database with one facility ("F1")
    /// and one specification ("S1"), plus a second facility ("F2").
    pub struct Fixture {
        pub sql: Arc<dyn SQLStore>,
        pub svc: AllocationService,
        pub f1: Facility,
        pub f2: Facility,
        pub s1: CpuSpecification,
    }

    pub fn fixture() -> Fixture {
        let sql: Arc<dyn SQLStore> = Arc::new(SqliteStore::open_in_memory().unwrap());
        let svc = AllocationService::with_sql(sql.clone()).unwrap();

        let directory = SqlFacilityDirectory::new(sql.clone());
        let f1 = directory.upsert_facility(facility("Likoni Sub-County Hospital", "11536")).unwrap();
        let f2 = directory.upsert_facility(facility("Port Reitz Hospital", "11740")).unwrap();

        let s1 = SqlSpecRegistry::new(sql.clone())
            .resolve_or_create(&SpecFields {
                manufacturer: "Dell".into(),
                model: "OptiPlex 3080".into(),
                processor: "Intel Core i5-10500".into(),
                memory: "8GB".into(),
                storage: "256GB SSD".into(),
            })
            .unwrap();

        Fixture { sql, svc, f1, f2, s1 }
    }

    fn facility(name: &str, mfl: &str) -> Facility {
        Facility {
            id: String::new(),
            name: name.into(),
            mfl_code: mfl.into(),
            county_id: None,
            create_at: None,
        }
    }
}
