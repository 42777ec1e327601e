use asman_core::ServiceError;
use asman_sql::SQLStore;

/// SQL DDL statements to initialize the allocation database schema.
///
/// The UNIQUE columns are the authoritative uniqueness guarantee; service
/// pre-checks only give earlier, friendlier errors. SQLite allows any number
/// of NULLs in a UNIQUE column, so absent monitor/UPS serials never collide.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS counties (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        name TEXT NOT NULL UNIQUE,
        code TEXT NOT NULL UNIQUE
    )",
    "CREATE TABLE IF NOT EXISTS facilities (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        name TEXT NOT NULL,
        mfl_code TEXT NOT NULL UNIQUE,
        county_id TEXT,
        create_at TEXT
    )",
    "CREATE TABLE IF NOT EXISTS cpu_specifications (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        manufacturer TEXT,
        model TEXT,
        processor TEXT NOT NULL,
        memory TEXT NOT NULL,
        storage TEXT NOT NULL,
        create_at TEXT,
        update_at TEXT,
        UNIQUE(processor, memory, storage)
    )",
    "CREATE TABLE IF NOT EXISTS asset_records (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        facility_id TEXT NOT NULL,
        cpu_spec_id TEXT,
        cpu_serial TEXT NOT NULL UNIQUE,
        monitor_serial TEXT UNIQUE,
        monitor_model TEXT,
        ups_serial TEXT UNIQUE,
        ups_model TEXT,
        allocated_at TEXT NOT NULL,
        update_at TEXT
    )",
    // Indexes
    "CREATE INDEX IF NOT EXISTS idx_fac_county ON facilities(county_id)",
    "CREATE INDEX IF NOT EXISTS idx_spec_model ON cpu_specifications(model)",
    "CREATE INDEX IF NOT EXISTS idx_asset_facility ON asset_records(facility_id)",
    "CREATE INDEX IF NOT EXISTS idx_asset_spec ON asset_records(cpu_spec_id)",
    "CREATE INDEX IF NOT EXISTS idx_asset_monitor_model ON asset_records(monitor_model)",
    "CREATE INDEX IF NOT EXISTS idx_asset_ups_model ON asset_records(ups_model)",
];

pub fn init_schema(sql: &dyn SQLStore) -> Result<(), ServiceError> {
    for stmt in SCHEMA {
        sql.exec(stmt, &[])
            .map_err(|e| ServiceError::Storage(format!("schema init failed: {}", e)))?;
    }
    Ok(())
}
