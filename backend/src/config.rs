//! Runtime configuration.
//!
//! Settings come from the environment (a `.env` file is loaded at startup by
//! the binary). CLI flags override individual values.
//!
//! | Variable                 | Default     |
//! |--------------------------|-------------|
//! | `REPORTLOAD_STORE`       | `s3`        |
//! | `REPORTLOAD_LOCAL_ROOT`  | `./buckets` |
//! | `REPORTLOAD_WORK_DIR`    | `/tmp`      |
//! | `REPORTLOAD_S3_ENDPOINT` | unset       |
//! | `PORT`                   | `3000`      |

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{ConfigError, ConfigResult};
use crate::storage::{LocalStore, ObjectStore, S3Store};

pub const ENV_STORE: &str = "REPORTLOAD_STORE";
pub const ENV_LOCAL_ROOT: &str = "REPORTLOAD_LOCAL_ROOT";
pub const ENV_WORK_DIR: &str = "REPORTLOAD_WORK_DIR";
pub const ENV_S3_ENDPOINT: &str = "REPORTLOAD_S3_ENDPOINT";
pub const ENV_PORT: &str = "PORT";

pub const DEFAULT_LOCAL_ROOT: &str = "./buckets";
pub const DEFAULT_WORK_DIR: &str = "/tmp";
pub const DEFAULT_PORT: u16 = 3000;

/// Which object store backs fetch and upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum StoreKind {
    S3,
    Local,
}

impl FromStr for StoreKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "s3" => Ok(StoreKind::S3),
            "local" => Ok(StoreKind::Local),
            other => Err(ConfigError::InvalidValue {
                name: ENV_STORE.to_string(),
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub store: StoreKind,
    pub local_root: PathBuf,
    pub work_dir: PathBuf,
    pub s3_endpoint: Option<String>,
    pub port: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store: StoreKind::S3,
            local_root: PathBuf::from(DEFAULT_LOCAL_ROOT),
            work_dir: PathBuf::from(DEFAULT_WORK_DIR),
            s3_endpoint: None,
            port: DEFAULT_PORT,
        }
    }
}

impl Settings {
    /// Load settings from process environment variables.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load settings through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut settings = Self::default();

        if let Some(store) = get(ENV_STORE) {
            settings.store = store.parse()?;
        }
        if let Some(root) = get(ENV_LOCAL_ROOT) {
            settings.local_root = PathBuf::from(root);
        }
        if let Some(dir) = get(ENV_WORK_DIR) {
            settings.work_dir = PathBuf::from(dir);
        }
        settings.s3_endpoint = get(ENV_S3_ENDPOINT);
        if let Some(port) = get(ENV_PORT) {
            settings.port = port.trim().parse().map_err(|_| ConfigError::InvalidValue {
                name: ENV_PORT.to_string(),
                value: port.clone(),
            })?;
        }

        Ok(settings)
    }

    /// Build the configured object store.
    pub async fn build_store(&self) -> Arc<dyn ObjectStore> {
        match self.store {
            StoreKind::S3 => Arc::new(S3Store::from_env(self.s3_endpoint.as_deref()).await),
            StoreKind::Local => Arc::new(LocalStore::new(self.local_root.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.work_dir, PathBuf::from("/tmp"));
        assert_eq!(settings.store, StoreKind::S3);
    }

    #[test]
    fn test_overrides() {
        let settings = Settings::from_lookup(lookup(&[
            ("REPORTLOAD_STORE", "Local"),
            ("REPORTLOAD_LOCAL_ROOT", "/srv/buckets"),
            ("REPORTLOAD_WORK_DIR", "/var/tmp/reportload"),
            ("REPORTLOAD_S3_ENDPOINT", "http://localhost:9000"),
            ("PORT", "8080"),
        ]))
        .unwrap();

        assert_eq!(settings.store, StoreKind::Local);
        assert_eq!(settings.local_root, PathBuf::from("/srv/buckets"));
        assert_eq!(settings.work_dir, PathBuf::from("/var/tmp/reportload"));
        assert_eq!(settings.s3_endpoint.as_deref(), Some("http://localhost:9000"));
        assert_eq!(settings.port, 8080);
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let settings = Settings::from_lookup(lookup(&[("PORT", "  "), ("REPORTLOAD_S3_ENDPOINT", "")])).unwrap();
        assert_eq!(settings.port, DEFAULT_PORT);
        assert!(settings.s3_endpoint.is_none());
    }

    #[test]
    fn test_invalid_values() {
        let err = Settings::from_lookup(lookup(&[("REPORTLOAD_STORE", "gcs")])).unwrap_err();
        assert!(err.to_string().contains("REPORTLOAD_STORE"));

        let err = Settings::from_lookup(lookup(&[("PORT", "eighty")])).unwrap_err();
        assert!(err.to_string().contains("eighty"));
    }
}
