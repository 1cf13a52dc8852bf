//! Integration tests for the demo microservice.

use bytes::Bytes;
use demo_microservice::prelude::*;
use http_body_util::{BodyExt, Empty};
use hyper::header::{HeaderMap, HeaderValue};
use hyper::Request;
use hyper_util::rt::TokioIo;
use serde_json::Value;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use uuid::Uuid;

fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn test_config() -> ServiceConfig {
    ServiceConfig::new()
        .host("127.0.0.1")
        .port(0)
        .app_version("v-3-1-4")
        .service_name("demo-microservice")
        .target_uri("https://rates.internal/v1")
}

fn context(pairs: &[(&str, &str)]) -> EndpointContext {
    EndpointContext::with_env(Arc::new(test_config()), Arc::new(env(pairs)))
}

fn body_json(response: &ServiceResponse) -> Value {
    response.json_body().unwrap().unwrap()
}

fn keys(value: &Value) -> Vec<String> {
    let mut keys: Vec<String> = value.as_object().unwrap().keys().cloned().collect();
    keys.sort();
    keys
}

// In-process dispatch through the router

#[test]
fn test_monetary_generated_ids_match_headers() {
    let router = Router::service();
    let response = router.dispatch(&ServiceRequest::get("/demo/monetary"), &context(&[]));

    assert_eq!(response.status, StatusCode::OK);
    let body = body_json(&response);
    let request_id = body["request_id"].as_str().unwrap();
    let correlation_id = body["correlation_id"].as_str().unwrap();

    assert!(Uuid::parse_str(request_id).is_ok());
    assert!(Uuid::parse_str(correlation_id).is_ok());
    assert_eq!(response.get_header("X-Request-ID"), Some(request_id));
    assert_eq!(response.get_header("X-Correlation-ID"), Some(correlation_id));
}

#[test]
fn test_monetary_echoes_supplied_ids() {
    let request = ServiceRequest::get("/demo/monetary")
        .header("X-Request-ID", "abc123")
        .header("X-Correlation-ID", "xyz789");
    let response = Router::service().dispatch(&request, &context(&[]));
    let body = body_json(&response);

    assert_eq!(body["request_id"], "abc123");
    assert_eq!(body["correlation_id"], "xyz789");
}

#[test]
fn test_monetary_document_shape() {
    let response = Router::service().dispatch(&ServiceRequest::get("/demo/monetary"), &context(&[]));
    let body = body_json(&response);

    assert_eq!(
        keys(&body),
        vec![
            "correlation_id",
            "endpoint",
            "monetary_info",
            "request_id",
            "service",
            "status",
            "target_uri",
            "timestamp",
            "version"
        ]
    );
    assert_eq!(body["status"], "active");
    assert_eq!(body["target_uri"], "https://rates.internal/v1");
    assert_eq!(body["monetary_info"]["currency"], "USD");
    assert_eq!(body["monetary_info"]["exchange_rate"], 1.0);
    assert_eq!(body["monetary_info"]["provider"], "demo-service");
    assert_eq!(response.get_header("X-Build-Info"), Some("ArgoCD-Managed"));
    assert_eq!(response.get_header("X-App-Version"), Some("v-3-1-4"));
}

#[test]
fn test_demo_health_is_up() {
    let response = Router::service().dispatch(&ServiceRequest::get("/demo/health"), &context(&[]));

    assert_eq!(response.status, StatusCode::OK);
    let body = body_json(&response);
    assert_eq!(body["status"], "UP");
    assert_eq!(body["version"], "v-3-1-4");
    assert_eq!(keys(&body), vec!["service", "status", "timestamp", "version"]);
}

#[test]
fn test_demo_info_system_figures() {
    let response = Router::service().dispatch(&ServiceRequest::get("/demo/info"), &context(&[]));
    let body = body_json(&response);

    let processors = body["system"]["available_processors"].as_u64().unwrap();
    let host = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
    assert!(processors > 0);
    assert_eq!(processors as usize, host);

    for field in ["max_memory", "total_memory", "free_memory"] {
        assert!(body["system"][field].is_u64(), "{field} should be a byte count");
    }
    assert_eq!(body["app"], "demo-microservice");
    assert_eq!(body["spring_profiles"], "default");
    assert!(body["java_version"].as_str().unwrap().starts_with("rust-"));
}

#[test]
fn test_api_info_environment() {
    let router = Router::service();

    let staging = router.dispatch(
        &ServiceRequest::get("/api/info"),
        &context(&[("ENVIRONMENT", "staging")]),
    );
    assert_eq!(body_json(&staging)["environment"], "staging");

    let unset = router.dispatch(&ServiceRequest::get("/api/info"), &context(&[]));
    let body = body_json(&unset);
    assert_eq!(body["environment"], "local");
    assert_eq!(body["version"], "1.0.0");
    assert_eq!(keys(&body), vec!["description", "environment", "name", "version"]);
}

#[test]
fn test_api_health_and_hello() {
    let router = Router::service();

    let health = body_json(&router.dispatch(&ServiceRequest::get("/api/health"), &context(&[])));
    assert_eq!(health["status"], "UP");
    assert_eq!(health["service"], "demo-microservice");
    assert_eq!(health["version"], "1.0.0");

    let hello = body_json(&router.dispatch(&ServiceRequest::get("/api/hello"), &context(&[])));
    assert!(!hello["message"].as_str().unwrap().is_empty());
    let ts = hello["timestamp"].as_str().unwrap();
    assert!(chrono::NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M:%S%.f").is_ok());
}

#[test]
fn test_repeated_calls_keep_shape() {
    let router = Router::service();
    let ctx = context(&[]);

    for path in [
        "/demo/monetary",
        "/demo/health",
        "/demo/info",
        "/api/health",
        "/api/info",
        "/api/hello",
    ] {
        let first = body_json(&router.dispatch(&ServiceRequest::get(path), &ctx));
        let second = body_json(&router.dispatch(&ServiceRequest::get(path), &ctx));
        assert_eq!(keys(&first), keys(&second), "shape changed for {path}");
    }
}

// Over a real socket

type ServerHandle = JoinHandle<Result<(), ServiceError>>;

async fn start_server(pairs: &[(&str, &str)]) -> (SocketAddr, oneshot::Sender<()>, ServerHandle) {
    let server = DemoServer::with_env(test_config(), Arc::new(env(pairs)));
    let listener = server.bind().await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel::<()>();

    let handle = tokio::spawn(server.serve(listener, async move {
        let _ = rx.await;
    }));

    (addr, tx, handle)
}

async fn send(
    addr: SocketAddr,
    method: &str,
    path: &str,
    headers: &[(&str, &str)],
) -> (hyper::StatusCode, HeaderMap, Bytes) {
    let values: Vec<(&str, HeaderValue)> = headers
        .iter()
        .map(|(name, value)| (*name, HeaderValue::from_str(value).unwrap()))
        .collect();
    send_values(addr, method, path, values).await
}

async fn send_values(
    addr: SocketAddr,
    method: &str,
    path: &str,
    headers: Vec<(&str, HeaderValue)>,
) -> (hyper::StatusCode, HeaderMap, Bytes) {
    let stream = TcpStream::connect(addr).await.unwrap();
    let (mut sender, conn) = hyper::client::conn::http1::handshake(TokioIo::new(stream))
        .await
        .unwrap();
    tokio::spawn(async move {
        let _ = conn.await;
    });

    let mut builder = Request::builder()
        .method(method)
        .uri(path)
        .header("Host", addr.to_string());
    for (name, value) in headers {
        builder = builder.header(name, value);
    }

    let response = sender
        .send_request(builder.body(Empty::<Bytes>::new()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, headers, body)
}

#[tokio::test]
async fn test_server_monetary_over_http() {
    let (addr, shutdown, handle) = start_server(&[]).await;

    let (status, headers, body) = send(
        addr,
        "GET",
        "/demo/monetary",
        &[("X-Request-ID", "abc123"), ("X-Correlation-ID", "xyz789")],
    )
    .await;

    assert_eq!(status, hyper::StatusCode::OK);
    assert_eq!(headers["content-type"], "application/json");
    assert_eq!(headers["x-request-id"], "abc123");
    assert_eq!(headers["x-correlation-id"], "xyz789");
    assert_eq!(headers["x-app-version"], "v-3-1-4");
    assert_eq!(headers["x-service-name"], "demo-microservice");
    assert_eq!(headers["x-build-info"], "ArgoCD-Managed");
    assert!(headers["x-response-time"].to_str().unwrap().parse::<i64>().is_ok());

    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["request_id"], "abc123");
    assert_eq!(body["correlation_id"], "xyz789");

    shutdown.send(()).unwrap();
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_server_api_routes_over_http() {
    let (addr, shutdown, handle) = start_server(&[("ENVIRONMENT", "staging")]).await;

    let (status, headers, body) = send(addr, "GET", "/api/info", &[]).await;
    assert_eq!(status, hyper::StatusCode::OK);
    assert!(headers.get("x-app-version").is_none());
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["environment"], "staging");

    let (status, _, body) = send(addr, "GET", "/api/hello?name=ignored", &[]).await;
    assert_eq!(status, hyper::StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert!(!body["message"].as_str().unwrap().is_empty());

    shutdown.send(()).unwrap();
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_server_fallbacks_over_http() {
    let (addr, shutdown, handle) = start_server(&[]).await;

    let (status, _, body) = send(addr, "GET", "/unknown", &[]).await;
    assert_eq!(status, hyper::StatusCode::NOT_FOUND);
    assert!(body.is_empty());

    let (status, headers, _) = send(addr, "POST", "/demo/health", &[]).await;
    assert_eq!(status, hyper::StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(headers["allow"], "GET, HEAD");

    let (status, headers, body) = send(addr, "HEAD", "/demo/health", &[]).await;
    assert_eq!(status, hyper::StatusCode::OK);
    assert_eq!(headers["x-app-version"], "v-3-1-4");
    assert!(body.is_empty());

    shutdown.send(()).unwrap();
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_server_echoes_non_ascii_request_id() {
    let (addr, shutdown, handle) = start_server(&[]).await;

    let raw = b"caf\xC3\xA9";
    let (status, headers, body) = send_values(
        addr,
        "GET",
        "/demo/monetary",
        vec![("X-Request-ID", HeaderValue::from_bytes(raw).unwrap())],
    )
    .await;

    assert_eq!(status, hyper::StatusCode::OK);
    assert_eq!(headers["x-request-id"].as_bytes(), &raw[..]);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["request_id"], "caf\u{c3}\u{a9}");
    assert!(Uuid::parse_str(body["correlation_id"].as_str().unwrap()).is_ok());

    shutdown.send(()).unwrap();
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_server_echoes_empty_ids() {
    let (addr, shutdown, handle) = start_server(&[]).await;

    let (status, headers, body) = send(
        addr,
        "GET",
        "/demo/monetary",
        &[("X-Request-ID", ""), ("X-Correlation-ID", "")],
    )
    .await;

    assert_eq!(status, hyper::StatusCode::OK);
    assert_eq!(headers["x-request-id"], "");
    assert_eq!(headers["x-correlation-id"], "");
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["request_id"], "");
    assert_eq!(body["correlation_id"], "");

    shutdown.send(()).unwrap();
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_server_joins_repeated_request_ids() {
    let (addr, shutdown, handle) = start_server(&[]).await;

    let (status, headers, body) = send(
        addr,
        "GET",
        "/demo/monetary",
        &[("X-Request-ID", "first"), ("X-Request-ID", "second")],
    )
    .await;

    assert_eq!(status, hyper::StatusCode::OK);
    assert_eq!(headers["x-request-id"], "first,second");
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["request_id"], "first,second");

    shutdown.send(()).unwrap();
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_shutdown_closes_open_keep_alive_connection() {
    let (addr, shutdown, handle) = start_server(&[]).await;

    let stream = TcpStream::connect(addr).await.unwrap();
    let (mut sender, conn) = hyper::client::conn::http1::handshake(TokioIo::new(stream))
        .await
        .unwrap();
    let client = tokio::spawn(conn);

    let request = Request::builder()
        .uri("/demo/health")
        .header("Host", addr.to_string())
        .body(Empty::<Bytes>::new())
        .unwrap();
    let response = sender.send_request(request).await.unwrap();
    assert_eq!(response.status(), hyper::StatusCode::OK);
    response.into_body().collect().await.unwrap();

    shutdown.send(()).unwrap();

    // The server asks the idle connection to close instead of waiting out
    // the drain timeout, and the client side sees a clean end of stream.
    let served = tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("server did not finish draining");
    served.unwrap().unwrap();

    let closed = tokio::time::timeout(Duration::from_secs(2), client)
        .await
        .expect("client connection stayed open");
    closed.unwrap().unwrap();
}
