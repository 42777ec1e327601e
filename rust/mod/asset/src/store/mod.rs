//! Persistence for the allocation core.
//!
//! Each store is a trait so the allocation service can run against any
//! backend; the `Sql*` types implement them over [`asman_sql::SQLStore`].
//! Rows keep the full JSON document in a `data` column, with the fields
//! used for lookups and uniqueness extracted into indexed columns.

pub mod asset_record;
pub mod cpu_spec;
pub mod facility;
pub mod schema;
pub mod seed;

pub use asset_record::{AssetRecordStore, SqlAssetStore};
pub use cpu_spec::{SpecificationRegistry, SqlSpecRegistry};
pub use facility::{FacilityDirectory, SqlFacilityDirectory};
pub use seed::{SeedLoader, SeedReport};

use serde::de::DeserializeOwned;
use serde::Serialize;

use asman_core::ServiceError;
use asman_sql::{Row, SQLError};

pub(crate) fn storage_err(e: SQLError) -> ServiceError {
    ServiceError::Storage(e.to_string())
}

pub(crate) fn encode<T: Serialize>(record: &T) -> Result<String, ServiceError> {
    serde_json::to_string(record).map_err(|e| ServiceError::Internal(format!("serialize: {}", e)))
}

pub(crate) fn decode<T: DeserializeOwned>(row: &Row) -> Result<T, ServiceError> {
    let data = row
        .get_str("data")
        .ok_or_else(|| ServiceError::Internal("missing data column".into()))?;
    serde_json::from_str(data).map_err(|e| ServiceError::Internal(format!("deserialize: {}", e)))
}

pub(crate) fn decode_all<T: DeserializeOwned>(rows: &[Row]) -> Result<Vec<T>, ServiceError> {
    rows.iter().map(decode).collect()
}

/// Case-insensitive `LIKE` pattern matching `term` anywhere, with the
/// wildcard characters in `term` escaped (use with `ESCAPE '\'`).
pub(crate) fn like_contains(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.trim().to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_contains("Dell"), "%dell%");
        assert_eq!(like_contains(" 50%_off "), "%50\\%\\_off%");
    }
}
