use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use asman_core::ServiceError;

use super::{FacilitySummary, SpecSummary};

/// One computer set (CPU, optional monitor, optional UPS)
/// allocated to a facility.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssetRecord {
    pub id: String,

    /// Facility this set is allocated to.
    pub facility_id: String,

    /// Canonical specification. `None` only on records that predate
    /// specification normalization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_spec_id: Option<String>,

    /// Free-text CPU model carried by pre-normalization records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy_cpu_model: Option<String>,

    /// Required. Unique across all records.
    pub cpu_serial: String,

    /// Unique across all records when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monitor_serial: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monitor_model: Option<String>,

    /// Unique across all records when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ups_serial: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ups_model: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_tag: Option<String>,

    /// Set once at creation.
    pub allocated_at: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_at: Option<String>,
}

impl AssetRecord {
    /// The stored value of a serial field.
    pub fn serial(&self, field: SerialField) -> Option<&str> {
        match field {
            SerialField::Cpu => Some(self.cpu_serial.as_str()),
            SerialField::Monitor => self.monitor_serial.as_deref(),
            SerialField::Ups => self.ups_serial.as_deref(),
        }
    }
}

/// The serial-number fields that must be unique across records, in the
/// order they are validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerialField {
    Cpu,
    Monitor,
    Ups,
}

impl SerialField {
    pub const ALL: [SerialField; 3] = [SerialField::Cpu, SerialField::Monitor, SerialField::Ups];

    /// Storage column.
    pub fn column(self) -> &'static str {
        match self {
            SerialField::Cpu => "cpu_serial",
            SerialField::Monitor => "monitor_serial",
            SerialField::Ups => "ups_serial",
        }
    }

    /// Wire name, as reported in conflicts.
    pub fn field_name(self) -> &'static str {
        match self {
            SerialField::Cpu => "cpuSerial",
            SerialField::Monitor => "monitorSerial",
            SerialField::Ups => "upsSerial",
        }
    }

    pub fn from_column(column: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.column() == column)
    }
}

/// Model fields offered for auto-suggest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelField {
    Monitor,
    Ups,
}

impl ModelField {
    pub fn column(self) -> &'static str {
        match self {
            ModelField::Monitor => "monitor_model",
            ModelField::Ups => "ups_model",
        }
    }
}

impl FromStr for ModelField {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monitor" => Ok(ModelField::Monitor),
            "ups" => Ok(ModelField::Ups),
            other => Err(ServiceError::validation(
                "type",
                format!("must be 'monitor' or 'ups', got '{}'", other),
            )),
        }
    }
}

impl fmt::Display for ModelField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelField::Monitor => f.write_str("monitor"),
            ModelField::Ups => f.write_str("ups"),
        }
    }
}

/// Outbound projection of an asset record with its references resolved.
///
/// This is what the HTTP API and report renderers consume.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AllocationView {
    #[serde(flatten)]
    pub record: AssetRecord,

    /// `None` if the facility was removed by administration after allocation.
    pub facility: Option<FacilitySummary>,

    pub cpu_spec: Option<SpecSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_field_parses_case_insensitively() {
        assert_eq!("monitor".parse::<ModelField>().unwrap(), ModelField::Monitor);
        assert_eq!("UPS".parse::<ModelField>().unwrap(), ModelField::Ups);
        let err = "keyboard".parse::<ModelField>().unwrap_err();
        assert!(matches!(err, ServiceError::Validation { ref field, .. } if field == "type"));
    }

    #[test]
    fn serial_field_column_lookup() {
        assert_eq!(SerialField::from_column("ups_serial"), Some(SerialField::Ups));
        assert_eq!(SerialField::from_column("asset_tag"), None);
    }

    #[test]
    fn record_omits_absent_optionals() {
        let record = AssetRecord {
            id: "a1".into(),
            facility_id: "f1".into(),
            cpu_spec_id: Some("s1".into()),
            legacy_cpu_model: None,
            cpu_serial: "CPU-001".into(),
            monitor_serial: None,
            monitor_model: None,
            ups_serial: None,
            ups_model: None,
            asset_tag: None,
            allocated_at: "2026-01-05T08:00:00+00:00".into(),
            update_at: None,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["cpuSerial"], "CPU-001");
        assert!(json.get("monitorSerial").is_none());
        assert!(json.get("legacyCpuModel").is_none());
    }
}
