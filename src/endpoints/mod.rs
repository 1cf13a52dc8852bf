//! Endpoint trait and the two route groups served by the service.
//!
//! Each endpoint builds its JSON document synchronously from the immutable
//! [`ServiceConfig`] and the wall clock. Nothing is shared between requests.

pub mod api;
pub mod demo;

use crate::config::{EnvSource, ProcessEnv, ServiceConfig};
use crate::error::ServiceError;
use crate::http::{ServiceRequest, ServiceResponse};
use chrono::{DateTime, Local, SecondsFormat, Utc};
use std::sync::Arc;

pub use api::{ApiHealthEndpoint, ApiInfoEndpoint, HelloEndpoint};
pub use demo::{DemoHealthEndpoint, DemoInfoEndpoint, MonetaryEndpoint};

/// State handed to every endpoint invocation.
#[derive(Clone)]
pub struct EndpointContext {
    /// Configuration read at startup.
    pub config: Arc<ServiceConfig>,
    /// Source for values that are looked up per request.
    pub env: Arc<dyn EnvSource>,
}

impl EndpointContext {
    /// Create a context backed by the process environment.
    pub fn new(config: Arc<ServiceConfig>) -> Self {
        Self::with_env(config, Arc::new(ProcessEnv))
    }

    /// Create a context with a custom environment source.
    pub fn with_env(config: Arc<ServiceConfig>, env: Arc<dyn EnvSource>) -> Self {
        Self { config, env }
    }
}

impl std::fmt::Debug for EndpointContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndpointContext")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// A single GET route handler.
pub trait Endpoint: Send + Sync {
    /// Build the response for a matched request.
    fn handle(
        &self,
        request: &ServiceRequest,
        ctx: &EndpointContext,
    ) -> Result<ServiceResponse, ServiceError>;

    /// Short name used in logs.
    fn name(&self) -> &str;
}

/// UTC instant with a `Z` suffix, as used by the `/demo` routes.
pub fn utc_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Local date-time without offset, as used by the `/api` routes.
pub fn local_timestamp() -> String {
    Local::now()
        .naive_local()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}
