//! Bootstrap: startup checks and facility seeding.
//!
//! When asmand starts:
//! 1. Verify the config names a data directory and a listen address.
//! 2. Load facility and county seed data into the directory.

use std::path::Path;
use std::sync::Arc;

use asman_sql::SQLStore;
use asset::store::{SeedLoader, SeedReport, SqlFacilityDirectory};
use tracing::info;

use crate::config::ServerConfig;

/// Verify server configuration is usable.
pub fn verify_config(config: &ServerConfig) -> anyhow::Result<()> {
    if config.storage.data_dir.trim().is_empty() {
        anyhow::bail!(
            "Storage data_dir is empty in configuration.\n\
             Set [storage] data_dir in the server config."
        );
    }
    if config.server.listen.trim().is_empty() {
        anyhow::bail!("Listen address is empty in configuration.");
    }
    Ok(())
}

/// Upsert seed facilities. The schema must already exist.
pub fn seed_facilities(sql: &Arc<dyn SQLStore>, seed_dir: &Path) -> anyhow::Result<SeedReport> {
    let directory = SqlFacilityDirectory::new(Arc::clone(sql));
    let report = SeedLoader::load(seed_dir, &directory)
        .map_err(|e| anyhow::anyhow!("failed to load seed data from {}: {}", seed_dir.display(), e))?;
    info!(
        "Seeded {} counties and {} facilities from {}",
        report.counties,
        report.facilities,
        seed_dir.display()
    );
    Ok(report)
}
