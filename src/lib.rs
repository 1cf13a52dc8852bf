//! # demo-microservice
//!
//! A stateless HTTP microservice that answers six GET routes with small JSON
//! documents: simulated monetary data, health and info reports, and a greeting.
//!
//! ## Routes
//!
//! ```text
//! /demo/monetary   version, service, target URI, request/correlation IDs,
//!                  monetary_info{currency, exchange_rate, ...}
//! /demo/health     status "UP" plus configured version and service name
//! /demo/info       configuration plus processor and memory figures
//! /api/health      status "UP" with a fixed service identity
//! /api/info        fixed identity plus ENVIRONMENT (default "local")
//! /api/hello       greeting and local timestamp
//! ```
//!
//! The `/demo` routes echo `X-App-Version`; `/demo/monetary` also echoes
//! `X-Request-ID` / `X-Correlation-ID` (generating v4 UUIDs when absent),
//! `X-Service-Name`, `X-Build-Info` and `X-Response-Time`.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use demo_microservice::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ServiceError> {
//!     let config = ServiceConfig::from_env()?;
//!     DemoServer::new(config).run().await
//! }
//! ```
//!
//! Configuration is read once at startup from `APP_VERSION`, `TARGET_URI`,
//! `SERVICE_NAME`, `SPRING_PROFILES_ACTIVE`, `HOST` and `PORT`.

pub mod config;
pub mod endpoints;
pub mod error;
pub mod http;
pub mod routing;
pub mod runtime;
pub mod system;

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::config::{EnvSource, ProcessEnv, ServiceConfig};
    pub use crate::endpoints::{Endpoint, EndpointContext};
    pub use crate::error::ServiceError;
    pub use crate::http::{Method, ServiceRequest, ServiceResponse, StatusCode};
    pub use crate::routing::Router;
    pub use crate::runtime::DemoServer;
}

pub use config::ServiceConfig;
pub use error::ServiceError;
pub use routing::Router;
pub use runtime::DemoServer;
