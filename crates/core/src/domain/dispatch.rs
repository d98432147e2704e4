// Dispatch Table - (method, path) -> handler routing shared with the HTTP server

use futures::future::BoxFuture;
use futures::FutureExt;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, RwLock};

/// Plain-text request as seen by a control-plane handler
#[derive(Debug, Clone, Default)]
pub struct HandlerRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub body: Vec<u8>,
}

/// Plain-text response produced by a control-plane handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerResponse {
    pub status: u16,
    pub body: String,
}

impl HandlerResponse {
    /// 200 with a text body
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    /// 200 with no body
    pub fn empty() -> Self {
        Self::ok(String::new())
    }

    pub fn not_found() -> Self {
        Self {
            status: 404,
            body: "not found".to_string(),
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self {
            status: 500,
            body: message.into(),
        }
    }
}

pub type HandlerFuture = BoxFuture<'static, HandlerResponse>;

/// Request handler stored in the dispatch table
pub type Handler = Arc<dyn Fn(HandlerRequest) -> HandlerFuture + Send + Sync>;

/// Wrap an async closure as a [`Handler`]
pub fn handler_fn<F, Fut>(f: F) -> Handler
where
    F: Fn(HandlerRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResponse> + Send + 'static,
{
    Arc::new(move |req| f(req).boxed())
}

/// Routing key. Methods are upper-cased, paths carry no leading slash.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteKey {
    pub method: String,
    pub path: String,
}

impl RouteKey {
    pub fn new(method: &str, path: &str) -> Self {
        Self {
            method: method.to_ascii_uppercase(),
            path: path.trim_start_matches('/').to_string(),
        }
    }
}

/// A (method, path, handler) entry contributed by a component
#[derive(Clone)]
pub struct Route {
    pub method: String,
    pub path: String,
    pub handler: Handler,
}

impl Route {
    pub fn new(method: impl Into<String>, path: impl Into<String>, handler: Handler) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            handler,
        }
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Shared routing table read by the server on every request.
///
/// Entries are never removed: a stopped component's routes stay registered
/// for the lifetime of the process, and a later insert for the same key
/// replaces the handler.
#[derive(Default)]
pub struct DispatchTable {
    routes: RwLock<HashMap<RouteKey, Handler>>,
}

impl DispatchTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, method: &str, path: &str, handler: Handler) {
        let key = RouteKey::new(method, path);
        self.routes
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key, handler);
    }

    /// Merge component-contributed routes in one write
    pub fn merge(&self, routes: Vec<Route>) {
        let mut table = self
            .routes
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        for route in routes {
            table.insert(RouteKey::new(&route.method, &route.path), route.handler);
        }
    }

    pub fn get(&self, method: &str, path: &str) -> Option<Handler> {
        self.routes
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&RouteKey::new(method, path))
            .cloned()
    }

    pub fn contains(&self, method: &str, path: &str) -> bool {
        self.get(method, path).is_some()
    }

    pub fn len(&self) -> usize {
        self.routes
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve and run the handler for a request; unknown routes get 404
    pub async fn dispatch(&self, request: HandlerRequest) -> HandlerResponse {
        match self.get(&request.method, &request.path) {
            Some(handler) => handler(request).await,
            None => HandlerResponse::not_found(),
        }
    }
}
