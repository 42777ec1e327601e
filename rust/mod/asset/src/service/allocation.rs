use tracing::info;

use asman_core::{new_id, now_rfc3339, ServiceError};

use crate::model::{AllocationRequest, AssetRecord};
use super::AllocationService;

impl AllocationService {
    /// Allocate a new computer set to a facility.
    ///
    /// Steps run in order and the first failure aborts: validate, resolve
    /// the facility, resolve the CPU specification, check serials, persist.
    /// A specification created in step 3 is kept even if a later step fails.
    pub fn create_allocation(&self, request: AllocationRequest) -> Result<AssetRecord, ServiceError> {
        let request = request.validate()?;
        let Some(cpu) = request.cpu.as_ref() else {
            return Err(ServiceError::validation("cpuSpecId", "is required"));
        };

        let facility = self.require_facility(&request.facility_id)?;
        let spec = self.resolve_cpu(cpu)?;
        self.check_serials(&request, None)?;

        let record = AssetRecord {
            id: new_id(),
            facility_id: facility.id,
            cpu_spec_id: Some(spec.id),
            legacy_cpu_model: None,
            cpu_serial: request.cpu_serial,
            monitor_serial: request.monitor_serial,
            monitor_model: request.monitor_model,
            ups_serial: request.ups_serial,
            ups_model: request.ups_model,
            asset_tag: request.asset_tag,
            allocated_at: now_rfc3339(),
            update_at: None,
        };

        let record = self.assets.save(&record)?;
        info!(
            "allocated {} (cpu {}) to facility {}",
            record.id, record.cpu_serial, record.facility_id
        );
        Ok(record)
    }

    /// Replace the contents of an existing allocation.
    ///
    /// Optional serials, models and the asset tag are overwritten, so an
    /// absent value clears the stored one. A request without a CPU identity
    /// keeps the record's current specification.
    pub fn update_allocation(
        &self,
        id: &str,
        request: AllocationRequest,
    ) -> Result<AssetRecord, ServiceError> {
        let request = request.validate()?;
        let mut record = self
            .assets
            .find_by_id(id)?
            .ok_or_else(|| ServiceError::not_found("assetRecord", id))?;

        if request.facility_id != record.facility_id {
            record.facility_id = self.require_facility(&request.facility_id)?.id;
        }

        match (&request.cpu, &record.cpu_spec_id) {
            (Some(cpu), _) => {
                record.cpu_spec_id = Some(self.resolve_cpu(cpu)?.id);
                record.legacy_cpu_model = None;
            }
            (None, Some(_)) => {}
            (None, None) => {
                return Err(ServiceError::validation(
                    "cpuSpecId",
                    "is required for records without a specification",
                ));
            }
        }

        self.check_serials(&request, Some(&record.id))?;

        record.cpu_serial = request.cpu_serial;
        record.monitor_serial = request.monitor_serial;
        record.monitor_model = request.monitor_model;
        record.ups_serial = request.ups_serial;
        record.ups_model = request.ups_model;
        record.asset_tag = request.asset_tag;
        record.update_at = Some(now_rfc3339());

        let record = self.assets.update(&record)?;
        info!("allocation {} updated", record.id);
        Ok(record)
    }

    pub fn get_allocation(&self, id: &str) -> Result<AssetRecord, ServiceError> {
        self.assets
            .find_by_id(id)?
            .ok_or_else(|| ServiceError::not_found("assetRecord", id))
    }

    /// Remove an allocation. The referenced specification is left alone.
    pub fn delete_allocation(&self, id: &str) -> Result<(), ServiceError> {
        self.assets.delete(id)
    }
}
