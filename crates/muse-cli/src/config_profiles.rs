//! Persistent CLI profile configuration.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use muse_core::config::{SupabaseConfig, REDIRECT_URL_ENV, SUPABASE_ANON_KEY_ENV, SUPABASE_URL_ENV};
use muse_core::util::normalize_text_option;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const CONFIG_FILE_NAME: &str = "cli-config.json";
pub const PROFILE_ENV: &str = "MUSE_PROFILE";
const DEFAULT_PROFILE: &str = "default";
const CONFIG_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum ProfileConfigError {
    #[error("could not resolve a config directory")]
    NoConfigDir,
    #[error("{action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid profile config at {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type ProfileConfigResult<T> = Result<T, ProfileConfigError>;

/// All CLI profiles plus which one is active.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CliProfilesConfig {
    #[serde(default = "config_version")]
    pub version: u32,
    #[serde(default)]
    pub active_profile: Option<String>,
    #[serde(default)]
    pub profiles: BTreeMap<String, CliProfile>,
}

/// Supabase project settings for one profile. Environment variables win
/// over these at runtime.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CliProfile {
    #[serde(default)]
    pub supabase_url: Option<String>,
    #[serde(default)]
    pub supabase_anon_key: Option<String>,
    #[serde(default)]
    pub redirect_url: Option<String>,
}

const fn config_version() -> u32 {
    CONFIG_VERSION
}

impl Default for CliProfilesConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            active_profile: None,
            profiles: BTreeMap::new(),
        }
    }
}

pub fn default_config_path() -> ProfileConfigResult<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("muse").join(CONFIG_FILE_NAME))
        .ok_or(ProfileConfigError::NoConfigDir)
}

pub fn normalize_profile_name(value: Option<&str>) -> Option<String> {
    normalize_text_option(value.map(str::to_string))
}

impl CliProfilesConfig {
    pub fn load() -> ProfileConfigResult<Self> {
        Self::load_from_path(&default_config_path()?)
    }

    /// A missing file is an empty config.
    pub fn load_from_path(path: &Path) -> ProfileConfigResult<Self> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => return Err(io_error("failed to read", path, source)),
        };
        let mut config: Self =
            serde_json::from_str(&raw).map_err(|source| ProfileConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.normalize();
        Ok(config)
    }

    pub fn save(&self) -> ProfileConfigResult<PathBuf> {
        let path = default_config_path()?;
        self.save_to_path(&path)?;
        Ok(path)
    }

    pub fn save_to_path(&self, path: &Path) -> ProfileConfigResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|source| io_error("failed to create", parent, source))?;
        }

        let mut normalized = self.clone();
        normalized.normalize();
        let serialized =
            serde_json::to_string_pretty(&normalized).map_err(|source| ProfileConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        std::fs::write(path, serialized).map_err(|source| io_error("failed to write", path, source))
    }

    /// Explicit name, then `MUSE_PROFILE`, then the active profile.
    pub fn resolve_profile_name(&self, explicit: Option<&str>) -> String {
        normalize_profile_name(explicit)
            .or_else(|| normalize_profile_name(std::env::var(PROFILE_ENV).ok().as_deref()))
            .or_else(|| normalize_profile_name(self.active_profile.as_deref()))
            .unwrap_or_else(|| DEFAULT_PROFILE.to_string())
    }

    pub fn profile(&self, name: &str) -> Option<&CliProfile> {
        self.profiles.get(name)
    }

    pub fn profile_mut_or_default(&mut self, name: &str) -> &mut CliProfile {
        self.profiles.entry(name.to_string()).or_default()
    }

    fn normalize(&mut self) {
        self.active_profile = normalize_profile_name(self.active_profile.as_deref());
        for profile in self.profiles.values_mut() {
            profile.normalize();
        }
    }
}

impl CliProfile {
    /// Supabase settings with environment variables taking precedence.
    pub fn supabase_config(&self) -> muse_core::Result<Option<SupabaseConfig>> {
        let env = |key: &str| normalize_text_option(std::env::var(key).ok());
        SupabaseConfig::resolve_optional(
            env(SUPABASE_URL_ENV).or_else(|| self.supabase_url.clone()),
            env(SUPABASE_ANON_KEY_ENV).or_else(|| self.supabase_anon_key.clone()),
            env(REDIRECT_URL_ENV).or_else(|| self.redirect_url.clone()),
        )
    }

    /// Names of the fields a usable profile still lacks.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.supabase_url.is_none() {
            missing.push("supabase_url");
        }
        if self.supabase_anon_key.is_none() {
            missing.push("supabase_anon_key");
        }
        missing
    }

    fn normalize(&mut self) {
        self.supabase_url = normalize_text_option(self.supabase_url.take());
        self.supabase_anon_key = normalize_text_option(self.supabase_anon_key.take());
        self.redirect_url = normalize_text_option(self.redirect_url.take());
    }
}

fn io_error(action: &'static str, path: &Path, source: std::io::Error) -> ProfileConfigError {
    ProfileConfigError::Io {
        action,
        path: path.to_path_buf(),
        source,
    }
}
