use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info, warn};

use asman_core::ServiceError;

use crate::model::{County, Facility};
use super::SqlFacilityDirectory;

/// Seed file layout:
///
/// ```yaml
/// counties:
///   - code: "001"
///     name: Mombasa
/// facilities:
///   - name: Likoni Sub-County Hospital
///     mflCode: "11536"
///     county: "001"
/// ```
#[derive(Debug, Default, Deserialize)]
struct SeedFile {
    #[serde(default)]
    counties: Vec<CountySeed>,
    #[serde(default)]
    facilities: Vec<FacilitySeed>,
}

#[derive(Debug, Deserialize)]
struct CountySeed {
    code: String,
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FacilitySeed {
    name: String,
    mfl_code: String,
    /// County code.
    #[serde(default)]
    county: Option<String>,
}

/// Counts of rows written by a seed run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub counties: usize,
    pub facilities: usize,
}

/// SeedLoader populates the facility directory from `facilities.yaml`
/// (or `.yml`) in the seed directory.
///
/// Loading is idempotent: counties are keyed by code and facilities by MFL
/// code, so re-running updates names in place.
pub struct SeedLoader;

impl SeedLoader {
    pub fn load(
        seed_dir: &Path,
        directory: &SqlFacilityDirectory,
    ) -> Result<SeedReport, ServiceError> {
        let Some(path) = ["facilities.yaml", "facilities.yml"]
            .iter()
            .map(|name| seed_dir.join(name))
            .find(|p| p.is_file())
        else {
            debug!("SeedLoader: no facilities file in {:?}, skipping", seed_dir);
            return Ok(SeedReport::default());
        };

        let content = fs::read_to_string(&path)
            .map_err(|e| ServiceError::Storage(format!("read {:?}: {}", path, e)))?;
        let seed: SeedFile = serde_yml::from_str(&content)
            .map_err(|e| ServiceError::validation("seed", format!("{:?}: {}", path, e)))?;

        Self::apply(seed, directory)
    }

    fn apply(seed: SeedFile, directory: &SqlFacilityDirectory) -> Result<SeedReport, ServiceError> {
        let mut report = SeedReport::default();

        for c in seed.counties {
            directory.upsert_county(County {
                id: String::new(),
                name: c.name,
                code: c.code,
            })?;
            report.counties += 1;
        }

        for f in seed.facilities {
            let county_id = match f.county.as_deref() {
                Some(code) => match directory.find_county_by_code(code)? {
                    Some(county) => Some(county.id),
                    None => {
                        warn!(
                            "SeedLoader: facility {} names unknown county {}, leaving unset",
                            f.mfl_code, code
                        );
                        None
                    }
                },
                None => None,
            };
            directory.upsert_facility(Facility {
                id: String::new(),
                name: f.name,
                mfl_code: f.mfl_code,
                county_id,
                create_at: None,
            })?;
            report.facilities += 1;
        }

        info!(
            "SeedLoader: {} counties, {} facilities",
            report.counties, report.facilities
        );
        Ok(report)
    }
}
