//! HTTP types shared by endpoints, the router and the server.

mod request;
mod response;

pub use request::{Method, ServiceRequest};
pub use response::{ServiceResponse, StatusCode};

/// Header names used by the `/demo` routes.
pub mod headers {
    pub const APP_VERSION: &str = "X-App-Version";
    pub const SERVICE_NAME: &str = "X-Service-Name";
    pub const BUILD_INFO: &str = "X-Build-Info";
    pub const REQUEST_ID: &str = "X-Request-ID";
    pub const CORRELATION_ID: &str = "X-Correlation-ID";
    pub const RESPONSE_TIME: &str = "X-Response-Time";
}

/// Decode raw header bytes as ISO-8859-1, one char per byte, so obs-text
/// values survive the trip to a `String`.
pub fn decode_header_value(raw: &[u8]) -> String {
    raw.iter().map(|&b| char::from(b)).collect()
}

/// Inverse of [`decode_header_value`]. Strings holding chars above U+00FF
/// cannot have come from a request and are written as UTF-8.
pub fn encode_header_value(value: &str) -> Vec<u8> {
    if value.chars().all(|c| u32::from(c) <= 0xFF) {
        value.chars().map(|c| u32::from(c) as u8).collect()
    } else {
        value.as_bytes().to_vec()
    }
}
