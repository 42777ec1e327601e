use tracing::{info, warn};

use asman_core::ServiceError;

use crate::model::{bounded, required, CpuSpecification, SpecFields};
use super::AllocationService;

impl AllocationService {
    pub fn list_specifications(&self) -> Result<Vec<CpuSpecification>, ServiceError> {
        self.specs.list_all()
    }

    pub fn get_specification(&self, id: &str) -> Result<CpuSpecification, ServiceError> {
        self.specs
            .get_by_id(id)?
            .ok_or_else(|| ServiceError::not_found("cpuSpec", id))
    }

    /// Register raw fields from the admin form, returning the existing row
    /// when the triple is already known.
    pub fn register_specification(&self, fields: SpecFields) -> Result<CpuSpecification, ServiceError> {
        let fields = SpecFields {
            manufacturer: bounded("manufacturer", fields.manufacturer.trim().to_string())?,
            model: bounded("cpuModel", fields.model.trim().to_string())?,
            processor: required("processor", fields.processor)?,
            memory: required("memory", fields.memory)?,
            storage: required("storage", fields.storage)?,
        };
        self.specs.resolve_or_create(&fields)
    }

    /// Overwrite a specification's labels and triple. Moving onto a triple
    /// another row owns is `Conflict`.
    pub fn save_specification(
        &self,
        id: &str,
        mut spec: CpuSpecification,
    ) -> Result<CpuSpecification, ServiceError> {
        let current = self.get_specification(id)?;
        spec.id = current.id;
        spec.create_at = current.create_at;
        spec.manufacturer = bounded("manufacturer", spec.manufacturer.trim().to_string())?;
        spec.model = bounded("cpuModel", spec.model.trim().to_string())?;
        spec.processor = required("processor", spec.processor)?;
        spec.memory = required("memory", spec.memory)?;
        spec.storage = required("storage", spec.storage)?;
        self.specs.save(spec)
    }

    /// Remove a specification no asset record references.
    pub fn delete_specification(&self, id: &str) -> Result<(), ServiceError> {
        let in_use = self.assets.count_by_cpu_spec(id)?;
        if in_use > 0 {
            warn!("specification {} still referenced by {} records", id, in_use);
            return Err(ServiceError::conflict("cpuSpecId", id));
        }
        self.specs.delete(id)?;
        info!("specification {} removed", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AllocationRequest, MAX_FIELD_LEN};
    use crate::service::testing::fixture;

    fn fields(processor: &str) -> SpecFields {
        SpecFields {
            manufacturer: " Lenovo ".into(),
            model: "ThinkCentre M70q".into(),
            processor: processor.into(),
            memory: "8GB".into(),
            storage: "256GB SSD".into(),
        }
    }

    #[test]
    fn register_trims_and_dedups() {
        let f = fixture();
        let a = f.svc.register_specification(fields(" Intel Core i3-10100 ")).unwrap();
        assert_eq!(a.processor, "Intel Core i3-10100");
        assert_eq!(a.manufacturer, "Lenovo");

        let b = f.svc.register_specification(fields("Intel Core i3-10100")).unwrap();
        assert_eq!(a.id, b.id);
        assert_eq!(f.svc.list_specifications().unwrap().len(), 2);
    }

    #[test]
    fn register_requires_full_triple() {
        let f = fixture();
        let err = f.svc.register_specification(fields("  ")).unwrap_err();
        assert_eq!(err, ServiceError::validation("processor", "is required"));
    }

    #[test]
    fn overlong_fields_are_rejected() {
        let f = fixture();
        let long = "x".repeat(MAX_FIELD_LEN + 1);

        let err = f.svc.register_specification(fields(&long)).unwrap_err();
        assert!(matches!(err, ServiceError::Validation { ref field, .. } if field == "processor"));

        let mut spec = fields("Intel Core i3-10100");
        spec.model = long.clone();
        let err = f.svc.register_specification(spec).unwrap_err();
        assert!(matches!(err, ServiceError::Validation { ref field, .. } if field == "cpuModel"));

        let mut spec = f.s1.clone();
        spec.storage = long;
        let err = f.svc.save_specification(&f.s1.id, spec).unwrap_err();
        assert!(matches!(err, ServiceError::Validation { ref field, .. } if field == "storage"));
        assert_eq!(f.svc.get_specification(&f.s1.id).unwrap().storage, f.s1.storage);
    }

    #[test]
    fn save_keeps_identity() {
        let f = fixture();
        let mut spec = f.s1.clone();
        spec.id = "ignored".into();
        spec.supplier = Some("Acme Supplies".into());
        let saved = f.svc.save_specification(&f.s1.id, spec).unwrap();
        assert_eq!(saved.id, f.s1.id);
        assert_eq!(saved.create_at, f.s1.create_at);
        assert_eq!(
            f.svc.get_specification(&f.s1.id).unwrap().supplier.as_deref(),
            Some("Acme Supplies")
        );
    }

    #[test]
    fn save_onto_taken_triple_is_conflict() {
        let f = fixture();
        let other = f.svc.register_specification(fields("Intel Core i3-10100")).unwrap();
        let mut moved = other.clone();
        moved.processor = f.s1.processor.clone();
        let err = f.svc.save_specification(&other.id, moved).unwrap_err();
        assert!(matches!(err, ServiceError::Conflict { ref field, .. } if field == "cpuSpecification"));
    }

    #[test]
    fn delete_refuses_referenced_spec() {
        let f = fixture();
        let record = f
            .svc
            .create_allocation(AllocationRequest::new(&f.f1.id, &f.s1.id, "CPU-001"))
            .unwrap();

        let err = f.svc.delete_specification(&f.s1.id).unwrap_err();
        assert_eq!(err, ServiceError::conflict("cpuSpecId", f.s1.id.clone()));

        f.svc.delete_allocation(&record.id).unwrap();
        f.svc.delete_specification(&f.s1.id).unwrap();
        assert_eq!(
            f.svc.get_specification(&f.s1.id).unwrap_err(),
            ServiceError::not_found("cpuSpec", f.s1.id.clone())
        );
    }
}
