use serde::{Deserialize, Serialize};

/// The administrative region a facility belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct County {
    pub id: String,

    /// Display name (unique).
    pub name: String,

    /// Official county code (unique), e.g. "047".
    pub code: String,
}
