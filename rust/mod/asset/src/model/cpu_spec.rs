use serde::{Deserialize, Serialize};

/// A canonical hardware configuration shared by many
/// asset records.
///
/// The (processor, memory, storage) triple is the dedup key; manufacturer
/// and model are labels kept from whoever registered the triple first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CpuSpecification {
    pub id: String,

    /// e.g. "Dell".
    pub manufacturer: String,

    /// e.g. "OptiPlex 5090".
    pub model: String,

    /// e.g. "Intel Core i5-10500".
    pub processor: String,

    /// e.g. "8GB DDR4".
    pub memory: String,

    /// e.g. "500GB HDD".
    pub storage: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_at: Option<String>,
}

impl CpuSpecification {
    /// The dedup key, rendered for messages.
    pub fn triple_label(&self) -> String {
        format!("{} / {} / {}", self.processor, self.memory, self.storage)
    }
}

/// Raw specification fields as typed by an operator, before dedup.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SpecFields {
    #[serde(default)]
    pub manufacturer: String,

    #[serde(default)]
    pub model: String,

    pub processor: String,

    pub memory: String,

    #[serde(alias = "hardDisk")]
    pub storage: String,
}

/// The slice of a specification embedded in allocation responses.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SpecSummary {
    pub id: String,
    pub manufacturer: String,
    pub model: String,
    pub processor: String,
    pub memory: String,
    pub storage: String,
}

impl From<&CpuSpecification> for SpecSummary {
    fn from(s: &CpuSpecification) -> Self {
        Self {
            id: s.id.clone(),
            manufacturer: s.manufacturer.clone(),
            model: s.model.clone(),
            processor: s.processor.clone(),
            memory: s.memory.clone(),
            storage: s.storage.clone(),
        }
    }
}
