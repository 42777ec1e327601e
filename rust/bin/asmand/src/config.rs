//! Server-side configuration, read from `/etc/asman/<name>.toml`.
//!
//! ```toml
//! [storage]
//! data_dir = "/var/lib/asman"
//! seed_dir = "/etc/asman/seed"   # optional, defaults to {data_dir}/seed
//!
//! [server]
//! listen = "0.0.0.0:8080"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Directory holding named server configs.
pub const CONFIG_DIR: &str = "/etc/asman";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    pub storage: StorageConfig,

    #[serde(default)]
    pub server: ListenConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,

    /// SQLite file. Defaults to `{data_dir}/data.sqlite`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sqlite_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed_dir: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListenConfig {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self { listen: default_listen() }
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".to_string()
}

impl ServerConfig {
    /// A bare context name maps to `/etc/asman/<name>.toml`; anything that
    /// looks like a path is used as-is.
    pub fn resolve_path(name_or_path: &str) -> PathBuf {
        if name_or_path.contains('/') || name_or_path.contains('.') {
            PathBuf::from(name_or_path)
        } else {
            Path::new(CONFIG_DIR).join(format!("{}.toml", name_or_path))
        }
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read {}: {}", path.display(), e))?;
        let config: ServerConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Map onto the core service config, letting `listen` override the
    /// configured address.
    pub fn to_service_config(&self, listen: Option<&str>) -> asman_core::ServiceConfig {
        asman_core::ServiceConfig {
            data_dir: Some(PathBuf::from(&self.storage.data_dir)),
            sqlite_path: self.storage.sqlite_path.as_ref().map(PathBuf::from),
            seed_dir: self.storage.seed_dir.as_ref().map(PathBuf::from),
            listen: listen.unwrap_or(&self.server.listen).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_path() {
        assert_eq!(
            ServerConfig::resolve_path("mombasa"),
            PathBuf::from("/etc/asman/mombasa.toml")
        );
        assert_eq!(
            ServerConfig::resolve_path("./dev.toml"),
            PathBuf::from("./dev.toml")
        );
    }

    #[test]
    fn test_load_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dev.toml");
        std::fs::write(&path, "[storage]\ndata_dir = \"/tmp/asman\"\n").unwrap();

        let config = ServerConfig::load(&path).unwrap();
        assert_eq!(config.storage.data_dir, "/tmp/asman");
        assert_eq!(config.server.listen, "0.0.0.0:8080");

        let core = config.to_service_config(None);
        assert_eq!(core.resolve_sqlite_path(), PathBuf::from("/tmp/asman/data.sqlite"));
        assert_eq!(core.resolve_seed_dir(), PathBuf::from("/tmp/asman/seed"));
    }

    #[test]
    fn test_listen_override() {
        let config = ServerConfig {
            storage: StorageConfig {
                data_dir: "/tmp".to_string(),
                ..Default::default()
            },
            server: ListenConfig { listen: "127.0.0.1:9000".to_string() },
        };
        assert_eq!(config.to_service_config(None).listen, "127.0.0.1:9000");
        assert_eq!(config.to_service_config(Some("0.0.0.0:80")).listen, "0.0.0.0:80");
    }

    #[test]
    fn test_missing_file() {
        assert!(ServerConfig::load(Path::new("/nonexistent/asman.toml")).is_err());
    }
}
