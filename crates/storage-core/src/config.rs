//! Storage adapter configuration types
//!
//! [`StorageOptions`] holds the per-adapter overrides and the connection
//! settings, [`MediaSettings`] the host application's media settings used as
//! fallbacks. Both are resolved eagerly into a [`ResolvedConfig`]; when the
//! host settings change the adapter is reconfigured explicitly.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::path;

/// Per-adapter options and remote connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageOptions {
    /// Namenode host
    pub host: String,

    /// Namenode RPC port
    pub port: u16,

    /// Principal used for the connection
    pub user: String,

    /// Root of the client runtime environment
    pub home: String,

    /// Desired block replication
    pub replication: u16,

    /// Root directory all names resolve under (falls back to `MEDIA_ROOT`)
    pub location: Option<String>,

    /// Public URL prefix (falls back to `MEDIA_URL`)
    pub base_url: Option<String>,

    /// Advisory permission bits for stored files
    pub file_permissions_mode: Option<u32>,

    /// Advisory permission bits for created directories
    pub directory_permissions_mode: Option<u32>,

    /// Prefix prepended to every generated name
    pub path_prefix: String,
}

impl Default for StorageOptions {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8020,
            user: "hadoop".to_string(),
            home: "/usr/lib/hadoop/".to_string(),
            replication: 3,
            location: None,
            base_url: None,
            file_permissions_mode: None,
            directory_permissions_mode: None,
            path_prefix: String::new(),
        }
    }
}

impl StorageOptions {
    /// Read connection settings from `HADOOP_HOST`, `HADOOP_PORT`,
    /// `HADOOP_USER`, `HADOOP_HOME` and `HADOOP_REPLICATION`
    pub fn from_env() -> Result<Self> {
        let mut options = Self::default();

        if let Some(host) = env_var("HADOOP_HOST") {
            options.host = host;
        }
        if let Some(port) = env_var("HADOOP_PORT") {
            options.port = parse_setting("HADOOP_PORT", &port)?;
        }
        if let Some(user) = env_var("HADOOP_USER") {
            options.user = user;
        }
        if let Some(home) = env_var("HADOOP_HOME") {
            options.home = home;
        }
        if let Some(replication) = env_var("HADOOP_REPLICATION") {
            options.replication = parse_setting("HADOOP_REPLICATION", &replication)?;
        }

        Ok(options)
    }

    /// Parse options from a JSON document; absent fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_path_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.path_prefix = prefix.into();
        self
    }
}

/// Host application media settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaSettings {
    /// `MEDIA_ROOT`
    pub media_root: Option<String>,

    /// `MEDIA_URL`
    pub media_url: Option<String>,

    /// `FILE_UPLOAD_PERMISSIONS`
    pub file_upload_permissions: Option<u32>,

    /// `FILE_UPLOAD_DIRECTORY_PERMISSIONS`
    pub file_upload_directory_permissions: Option<u32>,

    /// `USE_TZ`: timestamps are UTC when set, local wall time otherwise
    pub use_tz: bool,
}

impl Default for MediaSettings {
    fn default() -> Self {
        Self {
            media_root: None,
            media_url: None,
            file_upload_permissions: Some(0o644),
            file_upload_directory_permissions: None,
            use_tz: true,
        }
    }
}

impl MediaSettings {
    /// Read media settings from the process environment
    pub fn from_env() -> Result<Self> {
        let mut settings = Self::default();

        settings.media_root = env_var("MEDIA_ROOT");
        settings.media_url = env_var("MEDIA_URL");
        if let Some(mode) = env_var("FILE_UPLOAD_PERMISSIONS") {
            settings.file_upload_permissions = Some(parse_mode("FILE_UPLOAD_PERMISSIONS", &mode)?);
        }
        if let Some(mode) = env_var("FILE_UPLOAD_DIRECTORY_PERMISSIONS") {
            settings.file_upload_directory_permissions =
                Some(parse_mode("FILE_UPLOAD_DIRECTORY_PERMISSIONS", &mode)?);
        }
        if let Some(use_tz) = env_var("USE_TZ") {
            settings.use_tz = parse_bool("USE_TZ", &use_tz)?;
        }

        Ok(settings)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Configuration values derived from [`StorageOptions`] and [`MediaSettings`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedConfig {
    /// Absolute, normalized root location
    pub location: String,

    /// Public URL prefix, always ending with `/`
    pub base_url: Option<String>,

    pub file_permissions_mode: Option<u32>,

    pub directory_permissions_mode: Option<u32>,

    pub use_tz: bool,

    pub path_prefix: String,
}

impl ResolvedConfig {
    /// Compute every derived value; explicit options win over settings
    pub fn resolve(options: &StorageOptions, settings: &MediaSettings) -> Result<Self> {
        let base_location = options
            .location
            .as_deref()
            .or(settings.media_root.as_deref())
            .filter(|location| !location.is_empty())
            .ok_or_else(|| Error::MissingSetting {
                setting: "MEDIA_ROOT".to_string(),
            })?;

        let base_url = options
            .base_url
            .as_deref()
            .or(settings.media_url.as_deref())
            .filter(|url| !url.is_empty())
            .map(|url| {
                if url.ends_with('/') {
                    url.to_string()
                } else {
                    format!("{}/", url)
                }
            });

        Ok(Self {
            location: path::absolutize(base_location)?,
            base_url,
            file_permissions_mode: options
                .file_permissions_mode
                .or(settings.file_upload_permissions),
            directory_permissions_mode: options
                .directory_permissions_mode
                .or(settings.file_upload_directory_permissions),
            use_tz: settings.use_tz,
            path_prefix: options.path_prefix.clone(),
        })
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

fn parse_setting<T: std::str::FromStr>(setting: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e| Error::InvalidConfig {
        message: format!("{}={:?}: {}", setting, value, e),
    })
}

fn parse_mode(setting: &str, value: &str) -> Result<u32> {
    let digits = value.trim().trim_start_matches("0o");
    u32::from_str_radix(digits, 8).map_err(|e| Error::InvalidConfig {
        message: format!("{}={:?} is not an octal mode: {}", setting, value, e),
    })
}

fn parse_bool(setting: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::InvalidConfig {
            message: format!("{}={:?} is not a boolean", setting, value),
        }),
    }
}
