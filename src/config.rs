//! Service configuration.
//!
//! Values are read once from an [`EnvSource`] at startup and then shared
//! read-only behind an `Arc`. The only lookup that happens per request is
//! `ENVIRONMENT` for `/api/info`, which also goes through [`EnvSource`].

use crate::error::{Result, ServiceError};
use std::collections::HashMap;

pub const APP_VERSION_VAR: &str = "APP_VERSION";
pub const TARGET_URI_VAR: &str = "TARGET_URI";
pub const SERVICE_NAME_VAR: &str = "SERVICE_NAME";
pub const PROFILES_VAR: &str = "SPRING_PROFILES_ACTIVE";
pub const HOST_VAR: &str = "HOST";
pub const PORT_VAR: &str = "PORT";
pub const ENVIRONMENT_VAR: &str = "ENVIRONMENT";

pub const DEFAULT_APP_VERSION: &str = "v-1-0-0";
pub const DEFAULT_SERVICE_NAME: &str = "demo-microservice";
pub const DEFAULT_PROFILES: &str = "default";
pub const DEFAULT_ENVIRONMENT: &str = "local";

/// Source of environment-style key/value settings.
pub trait EnvSource: Send + Sync {
    /// Look up a variable. `None` when unset.
    fn var(&self, key: &str) -> Option<String>;
}

/// Reads from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Immutable configuration for the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Reported application version (`APP_VERSION`).
    pub app_version: String,
    /// Reported service name.
    pub service_name: String,
    /// Opaque target URI echoed by the `/demo` routes.
    pub target_uri: String,
    /// Active profile list reported by `/demo/info`.
    pub active_profiles: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            app_version: DEFAULT_APP_VERSION.to_string(),
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            target_uri: String::new(),
            active_profiles: DEFAULT_PROFILES.to_string(),
        }
    }
}

impl ServiceConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the config from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_source(&ProcessEnv)
    }

    /// Load the config from any environment source, falling back to defaults
    /// for unset variables.
    pub fn from_source(env: &dyn EnvSource) -> Result<Self> {
        let defaults = Self::default();

        let port = match env.var(PORT_VAR) {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| {
                ServiceError::config(format!("{PORT_VAR}='{raw}' is not a valid port: {e}"))
            })?,
            None => defaults.port,
        };

        Ok(Self {
            host: env.var(HOST_VAR).unwrap_or(defaults.host),
            port,
            app_version: env.var(APP_VERSION_VAR).unwrap_or(defaults.app_version),
            service_name: env.var(SERVICE_NAME_VAR).unwrap_or(defaults.service_name),
            target_uri: env.var(TARGET_URI_VAR).unwrap_or(defaults.target_uri),
            active_profiles: env.var(PROFILES_VAR).unwrap_or(defaults.active_profiles),
        })
    }

    /// Set the host address.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the application version.
    pub fn app_version(mut self, version: impl Into<String>) -> Self {
        self.app_version = version.into();
        self
    }

    /// Set the service name.
    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    /// Set the target URI.
    pub fn target_uri(mut self, uri: impl Into<String>) -> Self {
        self.target_uri = uri.into();
        self
    }

    /// Get the bind address.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Resolve the deployment environment name, consulted on every `/api/info`.
pub fn deployment_environment(env: &dyn EnvSource) -> String {
    env.var(ENVIRONMENT_VAR)
        .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string())
}
