//! Storage configuration

use mindcanvas_core::ConfigError;
use std::path::PathBuf;

pub const DEFAULT_DATA_DIR: &str = "data";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Directory holding one `{userId}.json` per user.
    pub data_dir: PathBuf,
    /// Hold a per-user mutex across each load/generate/save cycle.
    pub serialize_user_writes: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            serialize_user_writes: false,
        }
    }
}

impl StorageConfig {
    /// Environment variables:
    /// - `MINDCANVAS_DATA_DIR`: document directory (default: "data")
    /// - `MINDCANVAS_SERIALIZE_USER_WRITES`: "true" or "false" (default: false)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = lookup("MINDCANVAS_DATA_DIR")
            .map(|dir| dir.trim().to_string())
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        let serialize_user_writes = match lookup("MINDCANVAS_SERIALIZE_USER_WRITES") {
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" | "" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "MINDCANVAS_SERIALIZE_USER_WRITES".to_string(),
                        value: raw,
                        reason: "expected true or false".to_string(),
                    })
                }
            },
            None => false,
        };

        Ok(Self {
            data_dir,
            serialize_user_writes,
        })
    }
}
