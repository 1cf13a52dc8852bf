//! `/demo` route group: monetary info plus configuration-driven health and
//! info documents. Every response carries `X-App-Version`.

use super::{utc_timestamp, Endpoint, EndpointContext};
use crate::error::ServiceError;
use crate::http::{headers, ServiceRequest, ServiceResponse};
use crate::system::{SystemSnapshot, RUNTIME_VERSION};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MONETARY_PATH: &str = "/demo/monetary";
pub const HEALTH_PATH: &str = "/demo/health";
pub const INFO_PATH: &str = "/demo/info";

const BUILD_INFO: &str = "ArgoCD-Managed";

/// Simulated monetary data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonetaryInfo {
    /// Always `USD`.
    pub currency: String,
    /// Always `1.0`.
    pub exchange_rate: f64,
    /// Time the document was built.
    pub last_updated: String,
    /// Always `demo-service`.
    pub provider: String,
}

/// Body of `GET /demo/monetary`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonetaryDocument {
    /// Configured application version.
    pub version: String,
    /// Configured service name.
    pub service: String,
    /// Route path that produced the document.
    pub endpoint: String,
    /// UTC build time of the document.
    pub timestamp: String,
    /// Configured target URI, possibly empty.
    pub target_uri: String,
    /// Always `active`.
    pub status: String,
    /// Caller's `X-Request-ID`, or a generated UUID.
    pub request_id: String,
    /// Caller's `X-Correlation-ID`, or a generated UUID.
    pub correlation_id: String,
    /// Simulated monetary data.
    pub monetary_info: MonetaryInfo,
}

/// Body of `GET /demo/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemoHealthDocument {
    /// Always `UP`.
    pub status: String,
    /// Configured application version.
    pub version: String,
    /// Configured service name.
    pub service: String,
    /// UTC time of the check.
    pub timestamp: String,
}

/// Body of `GET /demo/info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemoInfoDocument {
    /// Configured service name.
    pub app: String,
    /// Configured application version.
    pub version: String,
    /// Configured target URI, possibly empty.
    pub target_uri: String,
    /// Runtime identification string.
    pub java_version: String,
    /// Active profiles read at startup.
    pub spring_profiles: String,
    /// UTC time the document was built.
    pub build_timestamp: String,
    /// Processor and memory figures.
    pub system: SystemSnapshot,
}

/// Caller-supplied header value, or a fresh random UUID when absent.
fn header_or_uuid(request: &ServiceRequest, name: &str) -> String {
    request
        .get_header(name)
        .map(str::to_owned)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// `GET /demo/monetary`
#[derive(Debug, Clone, Copy, Default)]
pub struct MonetaryEndpoint;

impl Endpoint for MonetaryEndpoint {
    fn handle(
        &self,
        request: &ServiceRequest,
        ctx: &EndpointContext,
    ) -> Result<ServiceResponse, ServiceError> {
        let config = &ctx.config;
        let request_id = header_or_uuid(request, headers::REQUEST_ID);
        let correlation_id = header_or_uuid(request, headers::CORRELATION_ID);
        let now = Utc::now();

        let document = MonetaryDocument {
            version: config.app_version.clone(),
            service: config.service_name.clone(),
            endpoint: MONETARY_PATH.to_string(),
            timestamp: utc_timestamp(now),
            target_uri: config.target_uri.clone(),
            status: "active".to_string(),
            request_id: request_id.clone(),
            correlation_id: correlation_id.clone(),
            monetary_info: MonetaryInfo {
                currency: "USD".to_string(),
                exchange_rate: 1.0,
                last_updated: utc_timestamp(now),
                provider: "demo-service".to_string(),
            },
        };

        Ok(ServiceResponse::json(&document)?
            .header(headers::APP_VERSION, config.app_version.as_str())
            .header(headers::SERVICE_NAME, config.service_name.as_str())
            .header(headers::BUILD_INFO, BUILD_INFO)
            .header(headers::REQUEST_ID, request_id)
            .header(headers::CORRELATION_ID, correlation_id)
            .header(
                headers::RESPONSE_TIME,
                Utc::now().timestamp_millis().to_string(),
            ))
    }

    fn name(&self) -> &str {
        "demo-monetary"
    }
}

/// `GET /demo/health`
#[derive(Debug, Clone, Copy, Default)]
pub struct DemoHealthEndpoint;

impl Endpoint for DemoHealthEndpoint {
    fn handle(
        &self,
        _request: &ServiceRequest,
        ctx: &EndpointContext,
    ) -> Result<ServiceResponse, ServiceError> {
        let document = DemoHealthDocument {
            status: "UP".to_string(),
            version: ctx.config.app_version.clone(),
            service: ctx.config.service_name.clone(),
            timestamp: utc_timestamp(Utc::now()),
        };

        Ok(ServiceResponse::json(&document)?
            .header(headers::APP_VERSION, ctx.config.app_version.as_str()))
    }

    fn name(&self) -> &str {
        "demo-health"
    }
}

/// `GET /demo/info`
#[derive(Debug, Clone, Copy, Default)]
pub struct DemoInfoEndpoint;

impl Endpoint for DemoInfoEndpoint {
    fn handle(
        &self,
        _request: &ServiceRequest,
        ctx: &EndpointContext,
    ) -> Result<ServiceResponse, ServiceError> {
        let config = &ctx.config;
        let document = DemoInfoDocument {
            app: config.service_name.clone(),
            version: config.app_version.clone(),
            target_uri: config.target_uri.clone(),
            java_version: RUNTIME_VERSION.to_string(),
            spring_profiles: config.active_profiles.clone(),
            build_timestamp: utc_timestamp(Utc::now()),
            system: SystemSnapshot::capture(),
        };

        Ok(ServiceResponse::json(&document)?
            .header(headers::APP_VERSION, config.app_version.as_str()))
    }

    fn name(&self) -> &str {
        "demo-info"
    }
}
