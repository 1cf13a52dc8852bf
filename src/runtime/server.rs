//! HTTP server: accepts connections and hands each request to the router.

use crate::config::{EnvSource, ProcessEnv, ServiceConfig};
use crate::endpoints::EndpointContext;
use crate::error::{Result, ServiceError};
use crate::http::{
    decode_header_value, encode_header_value, Method, ServiceRequest, ServiceResponse,
};
use crate::routing::Router;
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use hyper_util::server::graceful::GracefulShutdown;
use std::collections::hash_map::Entry;
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

/// How long shutdown waits for open connections to finish.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// The demo microservice HTTP server.
pub struct DemoServer {
    config: Arc<ServiceConfig>,
    router: Arc<Router>,
    ctx: EndpointContext,
}

impl DemoServer {
    /// Create a server reading per-request values from the process environment.
    pub fn new(config: ServiceConfig) -> Self {
        Self::with_env(config, Arc::new(ProcessEnv))
    }

    /// Create a server with a custom environment source.
    pub fn with_env(config: ServiceConfig, env: Arc<dyn EnvSource>) -> Self {
        let config = Arc::new(config);
        Self {
            ctx: EndpointContext::with_env(config.clone(), env),
            router: Arc::new(Router::service()),
            config,
        }
    }

    /// Bind a listener on the configured address.
    pub async fn bind(&self) -> Result<TcpListener> {
        let bind_addr = self.config.bind_addr();
        let addr: SocketAddr = bind_addr
            .parse()
            .map_err(|source| ServiceError::InvalidAddress {
                addr: bind_addr.clone(),
                source,
            })?;

        TcpListener::bind(addr)
            .await
            .map_err(|source| ServiceError::Bind {
                addr: bind_addr,
                source,
            })
    }

    /// Bind the configured address and serve until Ctrl-C.
    pub async fn run(self) -> Result<()> {
        let listener = self.bind().await?;
        self.serve(listener, shutdown_signal()).await
    }

    /// Serve connections from `listener` until `shutdown` resolves.
    ///
    /// After the signal no new connections are accepted. Open connections
    /// finish their current request and are closed, and this returns once
    /// they are all gone or [`DRAIN_TIMEOUT`] has passed.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let addr = listener.local_addr()?;
        info!(
            "Serving {} {} on http://{} (target_uri='{}')",
            self.config.service_name, self.config.app_version, addr, self.config.target_uri
        );

        let graceful = GracefulShutdown::new();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (stream, remote_addr) = match accepted {
                        Ok(conn) => conn,
                        Err(e) => {
                            error!("Failed to accept connection: {}", e);
                            continue;
                        }
                    };
                    let io = TokioIo::new(stream);

                    let router = self.router.clone();
                    let ctx = self.ctx.clone();

                    let service = service_fn(move |req| {
                        let router = router.clone();
                        let ctx = ctx.clone();
                        async move { handle_request(req, &router, &ctx, remote_addr) }
                    });
                    let conn = graceful.watch(http1::Builder::new().serve_connection(io, service));

                    tokio::task::spawn(async move {
                        if let Err(err) = conn.await {
                            error!("Error serving connection: {:?}", err);
                        }
                    });
                }
                _ = &mut shutdown => {
                    info!("Shutdown signal received, no longer accepting connections");
                    break;
                }
            }
        }

        drop(listener);

        tokio::select! {
            _ = graceful.shutdown() => {
                info!("All connections closed");
            }
            _ = tokio::time::sleep(DRAIN_TIMEOUT) => {
                warn!("Gave up waiting for open connections after {:?}", DRAIN_TIMEOUT);
            }
        }

        Ok(())
    }
}

/// Resolves on Ctrl-C. If the handler cannot be installed the server runs
/// until killed.
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Unable to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Handle an incoming HTTP request.
fn handle_request(
    req: Request<Incoming>,
    router: &Router,
    ctx: &EndpointContext,
    remote_addr: SocketAddr,
) -> std::result::Result<Response<Full<Bytes>>, Infallible> {
    let request = convert_request(&req);
    debug!(
        "Handling request: {} {} from {}",
        request.method, request.path, remote_addr
    );

    let response = router.dispatch(&request, ctx);

    info!(
        "{} {} - {} - Version: {}",
        req.method(),
        request.path,
        response.status,
        ctx.config.app_version
    );

    Ok(build_response(response))
}

/// Convert a hyper Request to a ServiceRequest. Values are decoded as
/// ISO-8859-1 and repeated headers are joined with `,`.
fn convert_request<B>(req: &Request<B>) -> ServiceRequest {
    let mut request = ServiceRequest::new(Method::from(req.method()), req.uri().path());

    for (name, value) in req.headers() {
        let value = decode_header_value(value.as_bytes());
        match request.headers.entry(name.as_str().to_string()) {
            Entry::Occupied(mut existing) => {
                let joined = existing.get_mut();
                joined.push(',');
                joined.push_str(&value);
            }
            Entry::Vacant(slot) => {
                slot.insert(value);
            }
        }
    }

    request
}

/// Build a hyper Response from a ServiceResponse.
fn build_response(response: ServiceResponse) -> Response<Full<Bytes>> {
    let status = hyper::StatusCode::from_u16(response.status.0).unwrap_or_else(|_| {
        warn!(
            "Invalid status code {}, falling back to 500 Internal Server Error",
            response.status.0
        );
        hyper::StatusCode::INTERNAL_SERVER_ERROR
    });

    let mut builder = Response::builder().status(status);

    for (name, value) in &response.headers {
        builder = builder.header(name.as_str(), encode_header_value(value));
    }

    let body = response.body.unwrap_or_default();
    builder.body(Full::new(body)).unwrap_or_else(|e| {
        error!("Failed to build response: {}", e);
        let mut fallback = Response::new(Full::new(Bytes::new()));
        *fallback.status_mut() = hyper::StatusCode::INTERNAL_SERVER_ERROR;
        fallback
    })
}
