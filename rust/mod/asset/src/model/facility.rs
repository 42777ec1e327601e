use serde::{Deserialize, Serialize};

/// A healthcare facility that hardware is allocated to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Facility {
    pub id: String,

    /// Facility display name.
    pub name: String,

    /// Master Facility List code, unique system-wide.
    pub mfl_code: String,

    /// County (region) the facility sits in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub county_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_at: Option<String>,
}

/// The slice of a facility embedded in allocation responses.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FacilitySummary {
    pub id: String,
    pub name: String,
    pub mfl_code: String,
}

impl From<&Facility> for FacilitySummary {
    fn from(f: &Facility) -> Self {
        Self {
            id: f.id.clone(),
            name: f.name.clone(),
            mfl_code: f.mfl_code.clone(),
        }
    }
}
