use std::sync::Arc;

use tracing::{debug, info};

use asman_core::{new_id, now_rfc3339, ServiceError};
use asman_sql::{SQLError, SQLStore, Value};

use crate::model::{CpuSpecification, SpecFields};
use super::{decode, decode_all, encode, storage_err};

/// Owns CPU specification identity: one canonical row per
/// (processor, memory, storage) triple.
pub trait SpecificationRegistry: Send + Sync {
    fn find_by_triple(
        &self,
        processor: &str,
        memory: &str,
        storage: &str,
    ) -> Result<Option<CpuSpecification>, ServiceError>;

    /// Insert a new row. A duplicate triple is `Conflict`.
    fn insert(&self, spec: &CpuSpecification) -> Result<(), ServiceError>;

    fn get_by_id(&self, id: &str) -> Result<Option<CpuSpecification>, ServiceError>;

    /// All specifications, ordered by model name.
    fn list_all(&self) -> Result<Vec<CpuSpecification>, ServiceError>;

    /// Administrative upsert. Skips dedup; the storage constraint on the
    /// triple still applies.
    fn save(&self, spec: CpuSpecification) -> Result<CpuSpecification, ServiceError>;

    /// Administrative removal. Does not look at asset records.
    fn delete(&self, id: &str) -> Result<(), ServiceError>;

    /// Return the canonical specification for the triple in `fields`,
    /// creating it from all of `fields` if none exists.
    ///
    /// An existing row is returned untouched: the manufacturer and model
    /// passed here are discarded. Losing an insert race to a concurrent
    /// caller shows up as `Conflict` and is answered by reading the
    /// winner's row.
    fn resolve_or_create(&self, fields: &SpecFields) -> Result<CpuSpecification, ServiceError> {
        if let Some(existing) =
            self.find_by_triple(&fields.processor, &fields.memory, &fields.storage)?
        {
            debug!("specification {} reused", existing.id);
            return Ok(existing);
        }

        let now = now_rfc3339();
        let spec = CpuSpecification {
            id: new_id(),
            manufacturer: fields.manufacturer.clone(),
            model: fields.model.clone(),
            processor: fields.processor.clone(),
            memory: fields.memory.clone(),
            storage: fields.storage.clone(),
            purchase_date: None,
            supplier: None,
            create_at: Some(now.clone()),
            update_at: Some(now),
        };

        match self.insert(&spec) {
            Ok(()) => {
                info!("specification {} created for {}", spec.id, spec.triple_label());
                Ok(spec)
            }
            Err(ServiceError::Conflict { .. }) => {
                debug!("specification {} inserted concurrently, re-reading", spec.triple_label());
                self.find_by_triple(&fields.processor, &fields.memory, &fields.storage)?
                    .ok_or_else(|| {
                        ServiceError::Storage(format!(
                            "specification {} rejected as duplicate but not found",
                            spec.triple_label()
                        ))
                    })
            }
            Err(e) => Err(e),
        }
    }
}

/// SQL-backed specification registry.
pub struct SqlSpecRegistry {
    sql: Arc<dyn SQLStore>,
}

impl SqlSpecRegistry {
    pub fn new(sql: Arc<dyn SQLStore>) -> Self {
        Self { sql }
    }

    fn write(&self, sql: &str, spec: &CpuSpecification) -> Result<(), ServiceError> {
        let json = encode(spec)?;
        self.sql
            .exec(
                sql,
                &[
                    Value::from(spec.id.as_str()),
                    Value::Text(json),
                    Value::from(spec.manufacturer.as_str()),
                    Value::from(spec.model.as_str()),
                    Value::from(spec.processor.as_str()),
                    Value::from(spec.memory.as_str()),
                    Value::from(spec.storage.as_str()),
                    Value::opt_text(spec.create_at.as_deref()),
                    Value::opt_text(spec.update_at.as_deref()),
                ],
            )
            .map_err(|e| match e {
                SQLError::Constraint(_) => {
                    ServiceError::conflict("cpuSpecification", spec.triple_label())
                }
                other => storage_err(other),
            })?;
        Ok(())
    }
}

impl SpecificationRegistry for SqlSpecRegistry {
    fn find_by_triple(
        &self,
        processor: &str,
        memory: &str,
        storage: &str,
    ) -> Result<Option<CpuSpecification>, ServiceError> {
        let rows = self
            .sql
            .query(
                "SELECT data FROM cpu_specifications
                 WHERE processor = ?1 AND memory = ?2 AND storage = ?3",
                &[processor.into(), memory.into(), storage.into()],
            )
            .map_err(storage_err)?;
        rows.first().map(decode).transpose()
    }

    fn insert(&self, spec: &CpuSpecification) -> Result<(), ServiceError> {
        self.write(
            "INSERT INTO cpu_specifications
                (id, data, manufacturer, model, processor, memory, storage, create_at, update_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            spec,
        )
    }

    fn get_by_id(&self, id: &str) -> Result<Option<CpuSpecification>, ServiceError> {
        let rows = self
            .sql
            .query("SELECT data FROM cpu_specifications WHERE id = ?1", &[id.into()])
            .map_err(storage_err)?;
        rows.first().map(decode).transpose()
    }

    fn list_all(&self) -> Result<Vec<CpuSpecification>, ServiceError> {
        let rows = self
            .sql
            .query("SELECT data FROM cpu_specifications ORDER BY model ASC, rowid", &[])
            .map_err(storage_err)?;
        decode_all(&rows)
    }

    fn save(&self, mut spec: CpuSpecification) -> Result<CpuSpecification, ServiceError> {
        let now = now_rfc3339();
        if spec.id.is_empty() {
            spec.id = new_id();
        }
        if spec.create_at.is_none() {
            spec.create_at = Some(now.clone());
        }
        spec.update_at = Some(now);

        self.write(
            "INSERT INTO cpu_specifications
                (id, data, manufacturer, model, processor, memory, storage, create_at, update_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(id) DO UPDATE SET
                data = excluded.data,
                manufacturer = excluded.manufacturer,
                model = excluded.model,
                processor = excluded.processor,
                memory = excluded.memory,
                storage = excluded.storage,
                update_at = excluded.update_at",
            &spec,
        )?;
        info!("specification {} saved", spec.id);
        Ok(spec)
    }

    fn delete(&self, id: &str) -> Result<(), ServiceError> {
        let affected = self
            .sql
            .exec("DELETE FROM cpu_specifications WHERE id = ?1", &[id.into()])
            .map_err(storage_err)?;
        if affected == 0 {
            return Err(ServiceError::not_found("cpuSpec", id));
        }
        info!("specification {} deleted", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::schema::init_schema;
    use asman_sql::SqliteStore;

    fn registry() -> SqlSpecRegistry {
        let sql = SqliteStore::open_in_memory().unwrap();
        init_schema(&sql).unwrap();
        SqlSpecRegistry::new(Arc::new(sql))
    }

    fn fields(manufacturer: &str, model: &str) -> SpecFields {
        SpecFields {
            manufacturer: manufacturer.into(),
            model: model.into(),
            processor: "Intel Core i5-10500".into(),
            memory: "8GB".into(),
            storage: "256GB SSD".into(),
        }
    }

    #[test]
    fn same_triple_resolves_to_one_row() {
        let reg = registry();
        let first = reg.resolve_or_create(&fields("Dell", "OptiPlex 3080")).unwrap();
        let second = reg.resolve_or_create(&fields("HP", "ProDesk 400")).unwrap();

        assert_eq!(first.id, second.id);
        // First writer's labels are canonical.
        assert_eq!(second.manufacturer, "Dell");
        assert_eq!(second.model, "OptiPlex 3080");
        assert_eq!(reg.list_all().unwrap().len(), 1);
    }

    #[test]
    fn different_triple_creates_new_row() {
        let reg = registry();
        let a = reg.resolve_or_create(&fields("Dell", "OptiPlex 3080")).unwrap();
        let mut other = fields("Dell", "OptiPlex 3080");
        other.memory = "16GB".into();
        let b = reg.resolve_or_create(&other).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(reg.list_all().unwrap().len(), 2);
    }

    #[test]
    fn duplicate_insert_is_conflict() {
        let reg = registry();
        let spec = reg.resolve_or_create(&fields("Dell", "OptiPlex 3080")).unwrap();
        let mut dup = spec.clone();
        dup.id = new_id();
        let err = reg.insert(&dup).unwrap_err();
        assert!(matches!(err, ServiceError::Conflict { ref field, .. } if field == "cpuSpecification"));
    }

    /// A registry whose first lookup misses, as if another request inserted
    /// the triple between our lookup and our insert.
    struct LateLookup {
        inner: SqlSpecRegistry,
        misses: std::sync::Mutex<u32>,
    }

    impl SpecificationRegistry for LateLookup {
        fn find_by_triple(
            &self,
            processor: &str,
            memory: &str,
            storage: &str,
        ) -> Result<Option<CpuSpecification>, ServiceError> {
            let mut misses = self.misses.lock().unwrap();
            if *misses > 0 {
                *misses -= 1;
                return Ok(None);
            }
            self.inner.find_by_triple(processor, memory, storage)
        }
        fn insert(&self, spec: &CpuSpecification) -> Result<(), ServiceError> {
            self.inner.insert(spec)
        }
        fn get_by_id(&self, id: &str) -> Result<Option<CpuSpecification>, ServiceError> {
            self.inner.get_by_id(id)
        }
        fn list_all(&self) -> Result<Vec<CpuSpecification>, ServiceError> {
            self.inner.list_all()
        }
        fn save(&self, spec: CpuSpecification) -> Result<CpuSpecification, ServiceError> {
            self.inner.save(spec)
        }
        fn delete(&self, id: &str) -> Result<(), ServiceError> {
            self.inner.delete(id)
        }
    }

    #[test]
    fn lost_insert_race_returns_existing_row() {
        let inner = registry();
        let winner = inner.resolve_or_create(&fields("Dell", "OptiPlex 3080")).unwrap();

        let racing = LateLookup { inner, misses: std::sync::Mutex::new(1) };
        let resolved = racing.resolve_or_create(&fields("Lenovo", "M70q")).unwrap();

        assert_eq!(resolved.id, winner.id);
        assert_eq!(racing.list_all().unwrap().len(), 1);
    }

    #[test]
    fn save_and_delete() {
        let reg = registry();
        let mut spec = reg.resolve_or_create(&fields("Dell", "OptiPlex 3080")).unwrap();
        spec.supplier = Some("Acme Supplies".into());
        spec.model = "OptiPlex 3080 SFF".into();
        let saved = reg.save(spec.clone()).unwrap();
        assert_eq!(saved.create_at, spec.create_at);

        let fetched = reg.get_by_id(&spec.id).unwrap().unwrap();
        assert_eq!(fetched.model, "OptiPlex 3080 SFF");
        assert_eq!(fetched.supplier.as_deref(), Some("Acme Supplies"));

        reg.delete(&spec.id).unwrap();
        assert!(reg.get_by_id(&spec.id).unwrap().is_none());
        let err = reg.delete(&spec.id).unwrap_err();
        assert_eq!(err, ServiceError::not_found("cpuSpec", spec.id.clone()));
    }

    #[test]
    fn list_is_ordered_by_model() {
        let reg = registry();
        for (model, mem) in [("ThinkCentre", "4GB"), ("EliteDesk", "8GB"), ("OptiPlex", "16GB")] {
            let mut f = fields("x", model);
            f.memory = mem.into();
            reg.resolve_or_create(&f).unwrap();
        }
        let models: Vec<String> = reg.list_all().unwrap().into_iter().map(|s| s.model).collect();
        assert_eq!(models, vec!["EliteDesk", "OptiPlex", "ThinkCentre"]);
    }
}
