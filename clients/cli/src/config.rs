//! Application configuration.
//!
//! Base URLs resolve in three layers: built-in defaults for the [`Environment`],
//! an optional JSON config file, then environment variables.

use crate::environment::Environment;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::{fs, path::Path};
use thiserror::Error;

pub const WANDERLIST_API_URL_VAR: &str = "WANDERLIST_API_URL";
pub const PACKAGES_API_URL_VAR: &str = "PACKAGES_API_URL";
pub const PUBLIC_APP_URL_VAR: &str = "PUBLIC_APP_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid base URL for {service} service ({url}): {reason}")]
    InvalidBaseUrl {
        service: Service,
        url: String,
        reason: String,
    },

    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not determine home directory")]
    NoHomeDir,
}

/// The backend services this client talks to.
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Service {
    /// Curated wanderlists, destinations and inquiries.
    Wanderlist,
    /// Travel packages catalogue.
    Packages,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub base_url: String,
}

/// Base URL for every [`Service`]. Built once at startup and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRegistry {
    wanderlist: ServiceConfig,
    packages: ServiceConfig,
    public_app_url: String,
}

impl ServiceRegistry {
    /// Creates a registry from explicit base URLs, validating that each one is absolute.
    pub fn new(
        wanderlist_url: impl Into<String>,
        packages_url: impl Into<String>,
        public_app_url: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            wanderlist: validated(Service::Wanderlist, wanderlist_url.into())?,
            packages: validated(Service::Packages, packages_url.into())?,
            public_app_url: public_app_url.into(),
        })
    }

    /// Resolves the registry from defaults, the optional config file and the process environment.
    pub fn from_env(environment: Environment, file: Option<&Config>) -> Result<Self, ConfigError> {
        Self::resolve_with(environment, file, |name| std::env::var(name).ok())
    }

    /// Same as [`ServiceRegistry::from_env`] with an injectable variable lookup.
    pub fn resolve_with<F>(
        environment: Environment,
        file: Option<&Config>,
        lookup: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |var: &str, from_file: Option<&String>, default: String| {
            lookup(var)
                .filter(|v| !v.is_empty())
                .or_else(|| from_file.cloned())
                .unwrap_or(default)
        };

        Self::new(
            pick(
                WANDERLIST_API_URL_VAR,
                file.and_then(|c| c.wanderlist_api_url.as_ref()),
                environment.wanderlist_api_url(),
            ),
            pick(
                PACKAGES_API_URL_VAR,
                file.and_then(|c| c.packages_api_url.as_ref()),
                environment.packages_api_url(),
            ),
            pick(
                PUBLIC_APP_URL_VAR,
                file.and_then(|c| c.public_app_url.as_ref()),
                environment.public_app_url(),
            ),
        )
    }

    pub fn get(&self, service: Service) -> &ServiceConfig {
        match service {
            Service::Wanderlist => &self.wanderlist,
            Service::Packages => &self.packages,
        }
    }

    pub fn public_app_url(&self) -> &str {
        &self.public_app_url
    }
}

fn validated(service: Service, url: String) -> Result<ServiceConfig, ConfigError> {
    match reqwest::Url::parse(&url) {
        Ok(_) => Ok(ServiceConfig { base_url: url }),
        Err(e) => Err(ConfigError::InvalidBaseUrl {
            service,
            url,
            reason: e.to_string(),
        }),
    }
}

/// On-disk overrides for the service URLs.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wanderlist_api_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packages_api_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_app_url: Option<String>,
}

impl Config {
    /// Loads configuration from a JSON file at the given path.
    ///
    /// # Errors
    /// Returns an `std::io::Error` if reading from file fails or JSON is invalid.
    pub fn load_from_file(path: &Path) -> Result<Self, std::io::Error> {
        let buf = fs::read(path)?;
        let config: Config = serde_json::from_slice(&buf)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        Ok(config)
    }

    /// Saves the configuration to a JSON file at the given path.
    ///
    /// Directories will be created if they don't exist. This method overwrites existing files.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Serialization failed: {}", e),
            )
        })?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// Default location of the config file: `~/.wander/config.json`.
pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    let home = home::home_dir().ok_or(ConfigError::NoHomeDir)?;
    Ok(home.join(".wander").join("config.json"))
}
