//! `/api` route group with fixed service identity.

use super::{local_timestamp, Endpoint, EndpointContext};
use crate::config::deployment_environment;
use crate::error::ServiceError;
use crate::http::{ServiceRequest, ServiceResponse};
use serde::{Deserialize, Serialize};

pub const HEALTH_PATH: &str = "/api/health";
pub const INFO_PATH: &str = "/api/info";
pub const HELLO_PATH: &str = "/api/hello";

const SERVICE: &str = "demo-microservice";
const VERSION: &str = "1.0.0";
const DISPLAY_NAME: &str = "Demo Microservice";
const DESCRIPTION: &str = "Microservicio de ejemplo para pruebas con Istio";
const GREETING: &str = "¡Hola desde el microservicio demo!";

/// Body of `GET /api/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiHealthDocument {
    /// Always `UP`.
    pub status: String,
    /// Local time of the check, no offset.
    pub timestamp: String,
    /// Always `demo-microservice`.
    pub service: String,
    /// Always `1.0.0`.
    pub version: String,
}

/// Body of `GET /api/info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiInfoDocument {
    /// Display name of the service.
    pub name: String,
    /// Fixed description.
    pub description: String,
    /// Always `1.0.0`.
    pub version: String,
    /// `ENVIRONMENT` at request time, `local` when unset.
    pub environment: String,
}

/// Body of `GET /api/hello`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelloDocument {
    /// Fixed greeting.
    pub message: String,
    /// Local time of the call, no offset.
    pub timestamp: String,
}

/// `GET /api/health`
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiHealthEndpoint;

impl Endpoint for ApiHealthEndpoint {
    fn handle(
        &self,
        _request: &ServiceRequest,
        _ctx: &EndpointContext,
    ) -> Result<ServiceResponse, ServiceError> {
        Ok(ServiceResponse::json(&ApiHealthDocument {
            status: "UP".to_string(),
            timestamp: local_timestamp(),
            service: SERVICE.to_string(),
            version: VERSION.to_string(),
        })?)
    }

    fn name(&self) -> &str {
        "api-health"
    }
}

/// `GET /api/info`. The environment name is resolved on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiInfoEndpoint;

impl Endpoint for ApiInfoEndpoint {
    fn handle(
        &self,
        _request: &ServiceRequest,
        ctx: &EndpointContext,
    ) -> Result<ServiceResponse, ServiceError> {
        Ok(ServiceResponse::json(&ApiInfoDocument {
            name: DISPLAY_NAME.to_string(),
            description: DESCRIPTION.to_string(),
            version: VERSION.to_string(),
            environment: deployment_environment(ctx.env.as_ref()),
        })?)
    }

    fn name(&self) -> &str {
        "api-info"
    }
}

/// `GET /api/hello`
#[derive(Debug, Clone, Copy, Default)]
pub struct HelloEndpoint;

impl Endpoint for HelloEndpoint {
    fn handle(
        &self,
        _request: &ServiceRequest,
        _ctx: &EndpointContext,
    ) -> Result<ServiceResponse, ServiceError> {
        Ok(ServiceResponse::json(&HelloDocument {
            message: GREETING.to_string(),
            timestamp: local_timestamp(),
        })?)
    }

    fn name(&self) -> &str {
        "api-hello"
    }
}
