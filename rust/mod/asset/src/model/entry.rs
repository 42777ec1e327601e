use serde::Deserialize;

use asman_core::{blank_to_none, ServiceError};

use super::SpecFields;

/// Longest value accepted for any free-text field.
pub const MAX_FIELD_LEN: usize = 255;

/// Asset entry as submitted by the scanning app or the admin form.
///
/// The CPU is identified either by `cpuSpecId` or, for older clients, by
/// raw processor/memory/storage fields that get normalized server-side.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetEntry {
    pub facility_id: Option<String>,
    pub cpu_spec_id: Option<String>,

    pub cpu_model: Option<String>,
    pub manufacturer: Option<String>,
    pub processor: Option<String>,
    pub memory: Option<String>,
    #[serde(alias = "hardDisk")]
    pub storage: Option<String>,

    pub cpu_serial: Option<String>,
    pub monitor_serial: Option<String>,
    pub monitor_model: Option<String>,
    pub ups_serial: Option<String>,
    pub ups_model: Option<String>,
    pub asset_tag: Option<String>,
}

/// How a request identifies its CPU specification.
#[derive(Debug, Clone, PartialEq)]
pub enum CpuIdentity {
    /// Reference to an existing canonical specification.
    Normalized(String),
    /// Raw fields, resolved through the specification registry.
    Raw(SpecFields),
}

/// A create-or-update allocation request.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationRequest {
    pub facility_id: String,
    pub cpu: Option<CpuIdentity>,
    pub cpu_serial: String,
    pub monitor_serial: Option<String>,
    pub monitor_model: Option<String>,
    pub ups_serial: Option<String>,
    pub ups_model: Option<String>,
    pub asset_tag: Option<String>,
}

impl AllocationRequest {
    /// Minimal request: facility, specification reference and CPU serial.
    pub fn new(facility_id: &str, cpu_spec_id: &str, cpu_serial: &str) -> Self {
        Self {
            facility_id: facility_id.to_string(),
            cpu: Some(CpuIdentity::Normalized(cpu_spec_id.to_string())),
            cpu_serial: cpu_serial.to_string(),
            monitor_serial: None,
            monitor_model: None,
            ups_serial: None,
            ups_model: None,
            asset_tag: None,
        }
    }

    /// Trim every field, drop blank optionals and check required fields and
    /// lengths. Touches no store.
    pub fn validate(self) -> Result<Self, ServiceError> {
        let facility_id = required("facilityId", self.facility_id)?;
        let cpu_serial = required("cpuSerial", self.cpu_serial)?;

        let cpu = match self.cpu {
            Some(CpuIdentity::Normalized(id)) => {
                Some(CpuIdentity::Normalized(required("cpuSpecId", id)?))
            }
            Some(CpuIdentity::Raw(fields)) => Some(CpuIdentity::Raw(SpecFields {
                manufacturer: bounded("manufacturer", fields.manufacturer.trim().to_string())?,
                model: bounded("cpuModel", fields.model.trim().to_string())?,
                processor: required("processor", fields.processor)?,
                memory: required("memory", fields.memory)?,
                storage: required("storage", fields.storage)?,
            })),
            None => None,
        };

        Ok(Self {
            facility_id,
            cpu,
            cpu_serial,
            monitor_serial: optional("monitorSerial", self.monitor_serial)?,
            monitor_model: optional("monitorModel", self.monitor_model)?,
            ups_serial: optional("upsSerial", self.ups_serial)?,
            ups_model: optional("upsModel", self.ups_model)?,
            asset_tag: optional("assetTag", self.asset_tag)?,
        })
    }
}

impl AssetEntry {
    /// Map the wire shape onto a validated request.
    pub fn into_request(self) -> Result<AllocationRequest, ServiceError> {
        let facility_id = blank_to_none(self.facility_id)
            .ok_or_else(|| ServiceError::validation("facilityId", "is required"))?;
        let cpu_serial = blank_to_none(self.cpu_serial)
            .ok_or_else(|| ServiceError::validation("cpuSerial", "is required"))?;

        let processor = blank_to_none(self.processor);
        let memory = blank_to_none(self.memory);
        let storage = blank_to_none(self.storage);

        let cpu = if let Some(id) = blank_to_none(self.cpu_spec_id) {
            Some(CpuIdentity::Normalized(id))
        } else if processor.is_some() || memory.is_some() || storage.is_some() {
            Some(CpuIdentity::Raw(SpecFields {
                manufacturer: self.manufacturer.unwrap_or_default(),
                model: self.cpu_model.unwrap_or_default(),
                processor: processor.unwrap_or_default(),
                memory: memory.unwrap_or_default(),
                storage: storage.unwrap_or_default(),
            }))
        } else {
            None
        };

        AllocationRequest {
            facility_id,
            cpu,
            cpu_serial,
            monitor_serial: self.monitor_serial,
            monitor_model: self.monitor_model,
            ups_serial: self.ups_serial,
            ups_model: self.ups_model,
            asset_tag: self.asset_tag,
        }
        .validate()
    }
}

pub(crate) fn required(field: &str, value: String) -> Result<String, ServiceError> {
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(ServiceError::validation(field, "is required"));
    }
    bounded(field, value)
}

fn optional(field: &str, value: Option<String>) -> Result<Option<String>, ServiceError> {
    blank_to_none(value).map(|v| bounded(field, v)).transpose()
}

pub(crate) fn bounded(field: &str, value: String) -> Result<String, ServiceError> {
    if value.chars().count() > MAX_FIELD_LEN {
        return Err(ServiceError::validation(
            field,
            format!("cannot exceed {} characters", MAX_FIELD_LEN),
        ));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(json: serde_json::Value) -> AssetEntry {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn spec_id_wins_over_raw_fields() {
        let req = entry(serde_json::json!({
            "facilityId": "f1",
            "cpuSpecId": "s1",
            "processor": "i5",
            "cpuSerial": "CPU-001",
        }))
        .into_request()
        .unwrap();
        assert_eq!(req.cpu, Some(CpuIdentity::Normalized("s1".into())));
    }

    #[test]
    fn raw_fields_become_raw_identity() {
        let req = entry(serde_json::json!({
            "facilityId": "f1",
            "cpuModel": "OptiPlex 3080",
            "manufacturer": "Dell",
            "processor": "i5",
            "memory": "8GB",
            "hardDisk": "256GB SSD",
            "cpuSerial": "CPU-001",
        }))
        .into_request()
        .unwrap();
        let Some(CpuIdentity::Raw(fields)) = req.cpu else {
            panic!("expected raw identity");
        };
        assert_eq!(fields.model, "OptiPlex 3080");
        assert_eq!(fields.storage, "256GB SSD");
    }

    #[test]
    fn partial_raw_triple_is_rejected() {
        let err = entry(serde_json::json!({
            "facilityId": "f1",
            "processor": "i5",
            "cpuSerial": "CPU-001",
        }))
        .into_request()
        .unwrap_err();
        assert_eq!(err, ServiceError::validation("memory", "is required"));
    }

    #[test]
    fn missing_required_fields() {
        let err = entry(serde_json::json!({"cpuSerial": "CPU-001"}))
            .into_request()
            .unwrap_err();
        assert_eq!(err, ServiceError::validation("facilityId", "is required"));

        let err = entry(serde_json::json!({"facilityId": "f1", "cpuSerial": "  "}))
            .into_request()
            .unwrap_err();
        assert_eq!(err, ServiceError::validation("cpuSerial", "is required"));
    }

    #[test]
    fn blank_optionals_are_dropped_and_serials_trimmed() {
        let req = entry(serde_json::json!({
            "facilityId": "f1",
            "cpuSpecId": "s1",
            "cpuSerial": " CPU-001 ",
            "monitorSerial": "",
            "upsSerial": " UPS-9 ",
        }))
        .into_request()
        .unwrap();
        assert_eq!(req.cpu_serial, "CPU-001");
        assert_eq!(req.monitor_serial, None);
        assert_eq!(req.ups_serial.as_deref(), Some("UPS-9"));
    }

    #[test]
    fn overlong_field_is_rejected() {
        let mut req = AllocationRequest::new("f1", "s1", "CPU-001");
        req.asset_tag = Some("x".repeat(MAX_FIELD_LEN + 1));
        let err = req.validate().unwrap_err();
        assert!(matches!(err, ServiceError::Validation { ref field, .. } if field == "assetTag"));
    }
}
