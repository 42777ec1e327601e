use std::collections::HashMap;

use tracing::debug;

use asman_core::ServiceError;

use crate::model::{
    AllocationView, AssetRecord, County, CpuSpecification, Facility, FacilitySummary, ModelField,
    SpecSummary,
};
use super::AllocationService;

/// Shortest prefix that triggers a model lookup.
pub const MIN_SUGGEST_PREFIX: usize = 2;

impl AllocationService {
    pub fn list_facilities(&self) -> Result<Vec<Facility>, ServiceError> {
        self.facilities.list_all()
    }

    pub fn get_facility(&self, id: &str) -> Result<Facility, ServiceError> {
        self.require_facility(id)
    }

    pub fn search_facilities(&self, term: &str) -> Result<Vec<Facility>, ServiceError> {
        self.facilities.search(term)
    }

    pub fn list_counties(&self) -> Result<Vec<County>, ServiceError> {
        self.facilities.list_counties()
    }

    /// Allocations at one facility, or all of them.
    pub fn list_assets(&self, facility_id: Option<&str>) -> Result<Vec<AssetRecord>, ServiceError> {
        match facility_id.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => self.assets.find_by_facility(id),
            None => self.assets.find_all(),
        }
    }

    pub fn search_assets(&self, query: &str) -> Result<Vec<AssetRecord>, ServiceError> {
        self.assets.search(query)
    }

    /// Distinct monitor or UPS models already on record that start with
    /// `prefix`. `field_type` is `monitor` or `ups`.
    pub fn suggest_model_values(
        &self,
        field_type: &str,
        prefix: &str,
    ) -> Result<Vec<String>, ServiceError> {
        let field: ModelField = field_type.parse()?;
        if prefix.chars().count() < MIN_SUGGEST_PREFIX {
            return Ok(Vec::new());
        }
        debug!("suggest {} models for '{}'", field, prefix);
        self.assets.search_model_values(field, prefix)
    }

    /// Attach the facility and specification summaries to a record.
    pub fn describe(&self, record: AssetRecord) -> Result<AllocationView, ServiceError> {
        let facility = self.facilities.get_by_id(&record.facility_id)?;
        let spec = match record.cpu_spec_id.as_deref() {
            Some(id) => self.specs.get_by_id(id)?,
            None => None,
        };
        Ok(AllocationView {
            facility: facility.as_ref().map(FacilitySummary::from),
            cpu_spec: spec.as_ref().map(SpecSummary::from),
            record,
        })
    }

    /// [`describe`](Self::describe) for many records, looking each facility
    /// and specification up once.
    pub fn describe_all(&self, records: Vec<AssetRecord>) -> Result<Vec<AllocationView>, ServiceError> {
        let mut facilities: HashMap<String, Option<Facility>> = HashMap::new();
        let mut specs: HashMap<String, Option<CpuSpecification>> = HashMap::new();
        let mut views = Vec::with_capacity(records.len());

        for record in records {
            if !facilities.contains_key(&record.facility_id) {
                let found = self.facilities.get_by_id(&record.facility_id)?;
                facilities.insert(record.facility_id.clone(), found);
            }
            let facility = facilities
                .get(&record.facility_id)
                .and_then(|f| f.as_ref())
                .map(FacilitySummary::from);

            let cpu_spec = match record.cpu_spec_id.as_deref() {
                Some(id) => {
                    if !specs.contains_key(id) {
                        specs.insert(id.to_string(), self.specs.get_by_id(id)?);
                    }
                    specs.get(id).and_then(|s| s.as_ref()).map(SpecSummary::from)
                }
                None => None,
            };

            views.push(AllocationView { record, facility, cpu_spec });
        }
        Ok(views)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AllocationRequest;
    use crate::service::testing::fixture;

    #[test]
    fn suggestions_need_two_characters() {
        let f = fixture();
        let mut req = AllocationRequest::new(&f.f1.id, &f.s1.id, "CPU-001");
        req.monitor_model = Some("Dell E1916".into());
        f.svc.create_allocation(req).unwrap();

        assert!(f.svc.suggest_model_values("monitor", "").unwrap().is_empty());
        assert!(f.svc.suggest_model_values("monitor", "D").unwrap().is_empty());
        assert_eq!(
            f.svc.suggest_model_values("monitor", "De").unwrap(),
            vec!["Dell E1916"]
        );
        assert!(f.svc.suggest_model_values("ups", "De").unwrap().is_empty());
    }

    #[test]
    fn suggestions_deduplicate_models() {
        let f = fixture();
        for (cpu, model) in [("C1", "Dell E1916"), ("C2", "Dell P2419"), ("C3", "Dell P2419"), ("C4", "Samsung S24")] {
            let mut req = AllocationRequest::new(&f.f1.id, &f.s1.id, cpu);
            req.monitor_model = Some(model.into());
            f.svc.create_allocation(req).unwrap();
        }
        let mut hits = f.svc.suggest_model_values("Monitor", "De").unwrap();
        hits.sort();
        assert_eq!(hits, vec!["Dell E1916", "Dell P2419"]);
    }

    #[test]
    fn unknown_suggestion_type_is_rejected() {
        let f = fixture();
        let err = f.svc.suggest_model_values("keyboard", "De").unwrap_err();
        assert!(matches!(err, ServiceError::Validation { ref field, .. } if field == "type"));
    }

    #[test]
    fn list_assets_by_facility() {
        let f = fixture();
        f.svc
            .create_allocation(AllocationRequest::new(&f.f1.id, &f.s1.id, "CPU-001"))
            .unwrap();
        f.svc
            .create_allocation(AllocationRequest::new(&f.f2.id, &f.s1.id, "CPU-002"))
            .unwrap();

        assert_eq!(f.svc.list_assets(None).unwrap().len(), 2);
        assert_eq!(f.svc.list_assets(Some("")).unwrap().len(), 2);
        let at_f2 = f.svc.list_assets(Some(&f.f2.id)).unwrap();
        assert_eq!(at_f2.len(), 1);
        assert_eq!(at_f2[0].cpu_serial, "CPU-002");
    }

    #[test]
    fn facilities_in_insertion_order() {
        let f = fixture();
        let ids: Vec<String> = f.svc.list_facilities().unwrap().into_iter().map(|x| x.id).collect();
        assert_eq!(ids, vec![f.f1.id.clone(), f.f2.id.clone()]);
        assert_eq!(f.svc.search_facilities("reitz").unwrap().len(), 1);
        assert_eq!(f.svc.get_facility(&f.f1.id).unwrap(), f.f1);
    }

    #[test]
    fn describe_resolves_references() {
        let f = fixture();
        let record = f
            .svc
            .create_allocation(AllocationRequest::new(&f.f1.id, &f.s1.id, "CPU-001"))
            .unwrap();

        let view = f.svc.describe(record.clone()).unwrap();
        assert_eq!(view.record, record);
        assert_eq!(view.facility.unwrap().mfl_code, "11536");
        assert_eq!(view.cpu_spec.unwrap().model, "OptiPlex 3080");

        let json = serde_json::to_value(f.svc.describe(record).unwrap()).unwrap();
        assert_eq!(json["cpuSerial"], "CPU-001");
        assert_eq!(json["facility"]["name"], "Likoni Sub-County Hospital");
        assert_eq!(json["cpuSpec"]["memory"], "8GB");
    }

    #[test]
    fn describe_all_tolerates_dangling_facility() {
        let f = fixture();
        let a = f
            .svc
            .create_allocation(AllocationRequest::new(&f.f1.id, &f.s1.id, "CPU-001"))
            .unwrap();
        let b = f
            .svc
            .create_allocation(AllocationRequest::new(&f.f2.id, &f.s1.id, "CPU-002"))
            .unwrap();
        f.sql
            .exec("DELETE FROM facilities WHERE id = ?1", &[f.f2.id.as_str().into()])
            .unwrap();

        let views = f.svc.describe_all(vec![a, b]).unwrap();
        assert!(views[0].facility.is_some());
        assert!(views[1].facility.is_none());
        assert!(views.iter().all(|v| v.cpu_spec.is_some()));
    }

    #[test]
    fn search_assets_by_facility_name() {
        let f = fixture();
        f.svc
            .create_allocation(AllocationRequest::new(&f.f1.id, &f.s1.id, "CPU-001"))
            .unwrap();
        assert_eq!(f.svc.search_assets("likoni").unwrap().len(), 1);
        assert_eq!(f.svc.search_assets("optiplex").unwrap().len(), 1);
        assert!(f.svc.search_assets("reitz").unwrap().is_empty());
    }
}
