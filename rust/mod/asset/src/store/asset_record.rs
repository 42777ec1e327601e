use std::sync::Arc;

use tracing::{debug, info};

use asman_core::ServiceError;
use asman_sql::{SQLError, SQLStore, Value};

use crate::model::{AssetRecord, ModelField, SerialField};
use super::{decode, decode_all, encode, like_contains, storage_err};

/// Persistence and uniqueness primitives for asset records.
pub trait AssetRecordStore: Send + Sync {
    /// Whether any record holds `serial` in `field`.
    fn exists_by_serial(&self, field: SerialField, serial: &str) -> Result<bool, ServiceError>;

    /// Same as [`exists_by_serial`](Self::exists_by_serial), ignoring the
    /// record `id`.
    fn exists_by_serial_excluding(
        &self,
        field: SerialField,
        serial: &str,
        id: &str,
    ) -> Result<bool, ServiceError>;

    fn find_by_id(&self, id: &str) -> Result<Option<AssetRecord>, ServiceError>;

    fn find_by_facility(&self, facility_id: &str) -> Result<Vec<AssetRecord>, ServiceError>;

    /// All records, in allocation order.
    fn find_all(&self) -> Result<Vec<AssetRecord>, ServiceError>;

    /// Insert or update. A serial already held by another record is
    /// `Conflict(field, value)`, the same error a pre-check produces.
    fn save(&self, record: &AssetRecord) -> Result<AssetRecord, ServiceError>;

    /// Overwrite an existing record. Never inserts: a record that is gone
    /// is `NotFound`. Serial conflicts are reported as in [`save`](Self::save).
    fn update(&self, record: &AssetRecord) -> Result<AssetRecord, ServiceError>;

    fn delete(&self, id: &str) -> Result<(), ServiceError>;

    /// Distinct values of a model field starting with `prefix`
    /// (case-sensitive, unordered).
    fn search_model_values(
        &self,
        field: ModelField,
        prefix: &str,
    ) -> Result<Vec<String>, ServiceError>;

    /// Number of records referencing a specification.
    fn count_by_cpu_spec(&self, spec_id: &str) -> Result<usize, ServiceError>;

    /// Case-insensitive substring search over CPU serial, facility name and
    /// specification model.
    fn search(&self, query: &str) -> Result<Vec<AssetRecord>, ServiceError>;
}

/// SQL-backed asset record store.
///
/// `search` joins `facilities` and `cpu_specifications`, so all three
/// tables must live in the same database.
pub struct SqlAssetStore {
    sql: Arc<dyn SQLStore>,
}

impl SqlAssetStore {
    pub fn new(sql: Arc<dyn SQLStore>) -> Self {
        Self { sql }
    }

    fn exists(&self, sql: &str, params: &[Value]) -> Result<bool, ServiceError> {
        let rows = self.sql.query(sql, params).map_err(storage_err)?;
        Ok(!rows.is_empty())
    }

    fn list(&self, sql: &str, params: &[Value]) -> Result<Vec<AssetRecord>, ServiceError> {
        let rows = self.sql.query(sql, params).map_err(storage_err)?;
        decode_all(&rows)
    }

    /// Translate a rejected write into the error a caller would have got
    /// from the pre-check.
    fn save_err(record: &AssetRecord, e: SQLError) -> ServiceError {
        let field = e
            .constraint_columns()
            .into_iter()
            .find_map(SerialField::from_column);
        match field {
            Some(field) => ServiceError::conflict(
                field.field_name(),
                record.serial(field).unwrap_or_default(),
            ),
            None => storage_err(e),
        }
    }
}

impl AssetRecordStore for SqlAssetStore {
    fn exists_by_serial(&self, field: SerialField, serial: &str) -> Result<bool, ServiceError> {
        let sql = format!(
            "SELECT 1 FROM asset_records WHERE {} = ?1 LIMIT 1",
            field.column()
        );
        self.exists(&sql, &[serial.into()])
    }

    fn exists_by_serial_excluding(
        &self,
        field: SerialField,
        serial: &str,
        id: &str,
    ) -> Result<bool, ServiceError> {
        let sql = format!(
            "SELECT 1 FROM asset_records WHERE {} = ?1 AND id <> ?2 LIMIT 1",
            field.column()
        );
        self.exists(&sql, &[serial.into(), id.into()])
    }

    fn find_by_id(&self, id: &str) -> Result<Option<AssetRecord>, ServiceError> {
        debug!("asset record lookup {}", id);
        let rows = self
            .sql
            .query("SELECT data FROM asset_records WHERE id = ?1", &[id.into()])
            .map_err(storage_err)?;
        rows.first().map(decode).transpose()
    }

    fn find_by_facility(&self, facility_id: &str) -> Result<Vec<AssetRecord>, ServiceError> {
        self.list(
            "SELECT data FROM asset_records WHERE facility_id = ?1 ORDER BY allocated_at, rowid",
            &[facility_id.into()],
        )
    }

    fn find_all(&self) -> Result<Vec<AssetRecord>, ServiceError> {
        self.list(
            "SELECT data FROM asset_records ORDER BY allocated_at, rowid",
            &[],
        )
    }

    fn save(&self, record: &AssetRecord) -> Result<AssetRecord, ServiceError> {
        let json = encode(record)?;
        self.sql
            .exec(
                "INSERT INTO asset_records
                    (id, data, facility_id, cpu_spec_id, cpu_serial, monitor_serial,
                     monitor_model, ups_serial, ups_model, allocated_at, update_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                 ON CONFLICT(id) DO UPDATE SET
                    data = excluded.data,
                    facility_id = excluded.facility_id,
                    cpu_spec_id = excluded.cpu_spec_id,
                    cpu_serial = excluded.cpu_serial,
                    monitor_serial = excluded.monitor_serial,
                    monitor_model = excluded.monitor_model,
                    ups_serial = excluded.ups_serial,
                    ups_model = excluded.ups_model,
                    update_at = excluded.update_at",
                &[
                    Value::from(record.id.as_str()),
                    Value::Text(json),
                    Value::from(record.facility_id.as_str()),
                    Value::opt_text(record.cpu_spec_id.as_deref()),
                    Value::from(record.cpu_serial.as_str()),
                    Value::opt_text(record.monitor_serial.as_deref()),
                    Value::opt_text(record.monitor_model.as_deref()),
                    Value::opt_text(record.ups_serial.as_deref()),
                    Value::opt_text(record.ups_model.as_deref()),
                    Value::from(record.allocated_at.as_str()),
                    Value::opt_text(record.update_at.as_deref()),
                ],
            )
            .map_err(|e| Self::save_err(record, e))?;
        Ok(record.clone())
    }

    fn update(&self, record: &AssetRecord) -> Result<AssetRecord, ServiceError> {
        let json = encode(record)?;
        let affected = self
            .sql
            .exec(
                "UPDATE asset_records SET
                    data = ?2,
                    facility_id = ?3,
                    cpu_spec_id = ?4,
                    cpu_serial = ?5,
                    monitor_serial = ?6,
                    monitor_model = ?7,
                    ups_serial = ?8,
                    ups_model = ?9,
                    update_at = ?10
                 WHERE id = ?1",
                &[
                    Value::from(record.id.as_str()),
                    Value::Text(json),
                    Value::from(record.facility_id.as_str()),
                    Value::opt_text(record.cpu_spec_id.as_deref()),
                    Value::from(record.cpu_serial.as_str()),
                    Value::opt_text(record.monitor_serial.as_deref()),
                    Value::opt_text(record.monitor_model.as_deref()),
                    Value::opt_text(record.ups_serial.as_deref()),
                    Value::opt_text(record.ups_model.as_deref()),
                    Value::opt_text(record.update_at.as_deref()),
                ],
            )
            .map_err(|e| Self::save_err(record, e))?;
        if affected == 0 {
            return Err(ServiceError::not_found("assetRecord", record.id.as_str()));
        }
        Ok(record.clone())
    }

    fn delete(&self, id: &str) -> Result<(), ServiceError> {
        let affected = self
            .sql
            .exec("DELETE FROM asset_records WHERE id = ?1", &[id.into()])
            .map_err(storage_err)?;
        if affected == 0 {
            return Err(ServiceError::not_found("assetRecord", id));
        }
        info!("asset record {} deleted", id);
        Ok(())
    }

    fn search_model_values(
        &self,
        field: ModelField,
        prefix: &str,
    ) -> Result<Vec<String>, ServiceError> {
        // substr() compares characters exactly, unlike LIKE which folds
        // ASCII case and treats % and _ as wildcards.
        let sql = format!(
            "SELECT DISTINCT {col} AS value FROM asset_records
             WHERE {col} IS NOT NULL AND substr({col}, 1, ?2) = ?1",
            col = field.column()
        );
        let rows = self
            .sql
            .query(
                &sql,
                &[prefix.into(), Value::Integer(prefix.chars().count() as i64)],
            )
            .map_err(storage_err)?;
        Ok(rows
            .iter()
            .filter_map(|r| r.get_str("value").map(String::from))
            .collect())
    }

    fn count_by_cpu_spec(&self, spec_id: &str) -> Result<usize, ServiceError> {
        let rows = self
            .sql
            .query(
                "SELECT COUNT(*) AS cnt FROM asset_records WHERE cpu_spec_id = ?1",
                &[spec_id.into()],
            )
            .map_err(storage_err)?;
        Ok(rows.first().and_then(|r| r.get_i64("cnt")).unwrap_or(0) as usize)
    }

    fn search(&self, query: &str) -> Result<Vec<AssetRecord>, ServiceError> {
        if query.trim().is_empty() {
            return self.find_all();
        }
        self.list(
            "SELECT a.data AS data FROM asset_records a
             LEFT JOIN facilities f ON f.id = a.facility_id
             LEFT JOIN cpu_specifications s ON s.id = a.cpu_spec_id
             WHERE lower(a.cpu_serial) LIKE ?1 ESCAPE '\\'
                OR lower(f.name) LIKE ?1 ESCAPE '\\'
                OR lower(s.model) LIKE ?1 ESCAPE '\\'
             ORDER BY a.allocated_at, a.rowid",
            &[Value::Text(like_contains(query))],
        )
    }
}
