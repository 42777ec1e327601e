use std::sync::Arc;

use tracing::debug;

use asman_core::{new_id, now_rfc3339, ServiceError};
use asman_sql::{SQLStore, Value};

use crate::model::{County, Facility};
use super::{decode, decode_all, encode, like_contains, storage_err};

/// Read access to allocation targets.
///
/// Facilities are maintained by administration; the allocation core only
/// looks them up.
pub trait FacilityDirectory: Send + Sync {
    fn get_by_id(&self, id: &str) -> Result<Option<Facility>, ServiceError>;

    /// All facilities, in insertion order.
    fn list_all(&self) -> Result<Vec<Facility>, ServiceError>;

    fn find_by_mfl_code(&self, mfl_code: &str) -> Result<Option<Facility>, ServiceError>;

    /// Case-insensitive substring match on name or MFL code. A blank term
    /// returns everything.
    fn search(&self, term: &str) -> Result<Vec<Facility>, ServiceError>;

    fn list_counties(&self) -> Result<Vec<County>, ServiceError>;
}

/// SQL-backed facility directory. Also carries the administrative upserts
/// used when seeding.
pub struct SqlFacilityDirectory {
    sql: Arc<dyn SQLStore>,
}

impl SqlFacilityDirectory {
    pub fn new(sql: Arc<dyn SQLStore>) -> Self {
        Self { sql }
    }

    fn query_one(&self, sql: &str, param: &str) -> Result<Option<Facility>, ServiceError> {
        let rows = self
            .sql
            .query(sql, &[Value::from(param)])
            .map_err(storage_err)?;
        rows.first().map(decode).transpose()
    }

    /// Insert or update a facility keyed by MFL code. An existing facility
    /// keeps its id and creation time.
    pub fn upsert_facility(&self, mut facility: Facility) -> Result<Facility, ServiceError> {
        match self.find_by_mfl_code(&facility.mfl_code)? {
            Some(existing) => {
                facility.id = existing.id;
                facility.create_at = existing.create_at;
            }
            None => {
                if facility.id.is_empty() {
                    facility.id = new_id();
                }
                if facility.create_at.is_none() {
                    facility.create_at = Some(now_rfc3339());
                }
            }
        }

        let json = encode(&facility)?;
        self.sql
            .exec(
                "INSERT INTO facilities (id, data, name, mfl_code, county_id, create_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(id) DO UPDATE SET
                    data = excluded.data,
                    name = excluded.name,
                    mfl_code = excluded.mfl_code,
                    county_id = excluded.county_id",
                &[
                    Value::from(facility.id.as_str()),
                    Value::Text(json),
                    Value::from(facility.name.as_str()),
                    Value::from(facility.mfl_code.as_str()),
                    Value::opt_text(facility.county_id.as_deref()),
                    Value::opt_text(facility.create_at.as_deref()),
                ],
            )
            .map_err(|e| match e {
                asman_sql::SQLError::Constraint(_) => {
                    ServiceError::conflict("mflCode", facility.mfl_code.clone())
                }
                other => storage_err(other),
            })?;

        Ok(facility)
    }

    /// Insert or update a county keyed by its code.
    pub fn upsert_county(&self, mut county: County) -> Result<County, ServiceError> {
        let rows = self
            .sql
            .query(
                "SELECT data FROM counties WHERE code = ?1",
                &[Value::from(county.code.as_str())],
            )
            .map_err(storage_err)?;
        let existing: Option<County> = rows.first().map(decode).transpose()?;
        county.id = match existing {
            Some(c) => c.id,
            None if county.id.is_empty() => new_id(),
            None => county.id,
        };

        let json = encode(&county)?;
        self.sql
            .exec(
                "INSERT INTO counties (id, data, name, code) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(id) DO UPDATE SET
                    data = excluded.data,
                    name = excluded.name,
                    code = excluded.code",
                &[
                    Value::from(county.id.as_str()),
                    Value::Text(json),
                    Value::from(county.name.as_str()),
                    Value::from(county.code.as_str()),
                ],
            )
            .map_err(|e| match e {
                asman_sql::SQLError::Constraint(_) => {
                    ServiceError::conflict("countyName", county.name.clone())
                }
                other => storage_err(other),
            })?;

        Ok(county)
    }

    pub fn find_county_by_code(&self, code: &str) -> Result<Option<County>, ServiceError> {
        let rows = self
            .sql
            .query("SELECT data FROM counties WHERE code = ?1", &[Value::from(code)])
            .map_err(storage_err)?;
        rows.first().map(decode).transpose()
    }
}

impl FacilityDirectory for SqlFacilityDirectory {
    fn get_by_id(&self, id: &str) -> Result<Option<Facility>, ServiceError> {
        debug!("facility lookup {}", id);
        self.query_one("SELECT data FROM facilities WHERE id = ?1", id)
    }

    fn list_all(&self) -> Result<Vec<Facility>, ServiceError> {
        let rows = self
            .sql
            .query("SELECT data FROM facilities ORDER BY rowid", &[])
            .map_err(storage_err)?;
        decode_all(&rows)
    }

    fn find_by_mfl_code(&self, mfl_code: &str) -> Result<Option<Facility>, ServiceError> {
        self.query_one("SELECT data FROM facilities WHERE mfl_code = ?1", mfl_code)
    }

    fn search(&self, term: &str) -> Result<Vec<Facility>, ServiceError> {
        if term.trim().is_empty() {
            return self.list_all();
        }
        let rows = self
            .sql
            .query(
                "SELECT data FROM facilities
                 WHERE lower(name) LIKE ?1 ESCAPE '\\' OR lower(mfl_code) LIKE ?1 ESCAPE '\\'
                 ORDER BY rowid",
                &[Value::Text(like_contains(term))],
            )
            .map_err(storage_err)?;
        decode_all(&rows)
    }

    fn list_counties(&self) -> Result<Vec<County>, ServiceError> {
        let rows = self
            .sql
            .query("SELECT data FROM counties ORDER BY name", &[])
            .map_err(storage_err)?;
        decode_all(&rows)
    }
}
