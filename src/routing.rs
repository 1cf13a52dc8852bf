//! Route table mapping incoming requests to endpoints.
//!
//! The table is built once and never mutated, so it is shared across
//! connections without locking.

use crate::endpoints::{
    api, demo, ApiHealthEndpoint, ApiInfoEndpoint, DemoHealthEndpoint, DemoInfoEndpoint,
    Endpoint, EndpointContext, HelloEndpoint, MonetaryEndpoint,
};
use crate::http::{Method, ServiceRequest, ServiceResponse, StatusCode};
use std::sync::Arc;
use tracing::error;

/// Methods every route answers to. HEAD is served as GET minus the body.
pub const ALLOWED_METHODS: &str = "GET, HEAD";

/// A route entry mapping an exact path to an endpoint.
#[derive(Clone)]
pub struct Route {
    /// Exact request path.
    pub path: String,
    /// Handler for this route.
    pub endpoint: Arc<dyn Endpoint>,
}

impl Route {
    /// Create a GET route.
    pub fn get(path: impl Into<String>, endpoint: impl Endpoint + 'static) -> Self {
        Self {
            path: path.into(),
            endpoint: Arc::new(endpoint),
        }
    }

    /// Check if this route accepts the given request method.
    pub fn accepts(method: Method) -> bool {
        matches!(method, Method::Get | Method::Head)
    }

    /// Check if this route matches the given path and method.
    pub fn matches(&self, path: &str, method: Method) -> bool {
        self.path == path && Self::accepts(method)
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("path", &self.path)
            .field("endpoint", &self.endpoint.name())
            .finish()
    }
}

/// Outcome of resolving a request against the table.
#[derive(Debug)]
pub enum RouteMatch<'a> {
    Found(&'a Route),
    MethodNotAllowed,
    NotFound,
}

/// Immutable route table.
#[derive(Debug, Clone, Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    /// Create an empty router.
    pub fn new() -> Self {
        Self::default()
    }

    /// Router with both `/demo` and `/api` route groups.
    pub fn service() -> Self {
        Self::new()
            .route(Route::get(demo::MONETARY_PATH, MonetaryEndpoint))
            .route(Route::get(demo::HEALTH_PATH, DemoHealthEndpoint))
            .route(Route::get(demo::INFO_PATH, DemoInfoEndpoint))
            .route(Route::get(api::HEALTH_PATH, ApiHealthEndpoint))
            .route(Route::get(api::INFO_PATH, ApiInfoEndpoint))
            .route(Route::get(api::HELLO_PATH, HelloEndpoint))
    }

    /// Add a route to the table.
    pub fn route(mut self, route: Route) -> Self {
        self.routes.push(route);
        self
    }

    /// Find the route for the given path and method.
    pub fn find(&self, path: &str, method: Method) -> RouteMatch<'_> {
        if let Some(route) = self.routes.iter().find(|r| r.matches(path, method)) {
            return RouteMatch::Found(route);
        }
        if self.routes.iter().any(|r| r.path == path) {
            RouteMatch::MethodNotAllowed
        } else {
            RouteMatch::NotFound
        }
    }

    /// List all routes.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Resolve and run the endpoint for a request. HEAD responses keep the
    /// headers but drop the body.
    pub fn dispatch(&self, request: &ServiceRequest, ctx: &EndpointContext) -> ServiceResponse {
        match self.find(&request.path, request.method) {
            RouteMatch::Found(route) => {
                let response = match route.endpoint.handle(request, ctx) {
                    Ok(response) => response,
                    Err(e) => {
                        error!("Endpoint '{}' failed: {}", route.endpoint.name(), e);
                        ServiceResponse::error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
                    }
                };
                if request.method == Method::Head {
                    ServiceResponse {
                        body: None,
                        ..response
                    }
                } else {
                    response
                }
            }
            RouteMatch::MethodNotAllowed => {
                ServiceResponse::new(StatusCode::METHOD_NOT_ALLOWED)
                    .header("Allow", ALLOWED_METHODS)
            }
            RouteMatch::NotFound => ServiceResponse::new(StatusCode::NOT_FOUND),
        }
    }
}
