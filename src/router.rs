//! Radix-tree request router.
//!
//! One tree per HTTP method, O(path-length) lookup via [`matchit`]. On top of
//! the plain lookup sits the middleware composition: router-level layers that
//! run for every matched route, and per-route [`Chain`]s for guards that only
//! some pages want.

use std::collections::HashMap;
use std::sync::Arc;

use matchit::Router as MatchitRouter;

use crate::handler::Handler;
use crate::method::Method;
use crate::middleware::{BoxedMiddleware, Chain, Middleware};
use crate::request::Request;
use crate::response::Response;

/// The application router.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve).
/// Each registration method returns `self` so calls chain naturally:
///
/// ```rust,no_run
/// use portico::middleware::{Chain, FlashMessages, InitLocals, RequireAdminUser, RequireUser};
/// use portico::{Method, Request, Response, Router};
///
/// # async fn home(_: Request) -> Response { Response::text("") }
/// # async fn members(_: Request) -> Response { Response::text("") }
/// # let organizations = vec![];
/// let app = Router::new()
///     .layer(InitLocals::new(organizations))
///     .layer(FlashMessages)
///     .on(Method::Get, "/", home)
///     .route(
///         Method::Get,
///         "/members/{org}",
///         Chain::new(members).layer(RequireUser).layer(RequireAdminUser),
///     );
/// ```
pub struct Router {
    routes: HashMap<Method, MatchitRouter<Arc<Chain>>>,
    layers: Vec<BoxedMiddleware>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new(), layers: Vec::new() }
    }

    /// Appends a router-level middleware, run for every matched route in
    /// registration order, before any route-level layers.
    ///
    /// Layers do not run for unmatched paths — a 404 has no handler to guard
    /// and no page to decorate.
    pub fn layer(mut self, middleware: impl Middleware) -> Self {
        self.layers.push(Arc::new(middleware));
        self
    }

    /// Registers a bare handler for a method + path pair.
    ///
    /// Path parameters use `{name}` syntax — `req.param("name")` retrieves
    /// them.
    pub fn on(self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.add(method, path, Chain::new(handler))
    }

    /// Registers a handler wrapped in route-level middleware.
    pub fn route(self, method: Method, path: &str, chain: Chain) -> Self {
        self.add(method, path, chain)
    }

    fn add(mut self, method: Method, path: &str, chain: Chain) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, Arc::new(chain))
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    pub(crate) fn lookup(
        &self,
        method: Method,
        path: &str,
    ) -> Option<(Arc<Chain>, HashMap<String, String>)> {
        let tree = self.routes.get(&method)?;
        let matched = tree.at(path).ok()?;
        let chain = Arc::clone(matched.value);
        let params = matched
            .params
            .iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((chain, params))
    }

    /// Runs the router-level layers and the route's chain for one request.
    pub(crate) async fn dispatch(&self, chain: &Chain, req: Request) -> Response {
        chain.run(&self.layers, req).await
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}
