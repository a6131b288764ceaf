//! Middleware layer.
//!
//! Middleware intercepts a request on its way to the route handler. Each
//! middleware receives the [`Request`] and a [`Next`] continuation and makes
//! one decision: call `next.run(req).await` to continue the chain, or return
//! a [`Response`] of its own — typically a redirect — to terminate it.
//!
//! ```text
//! request ──▶ router layers… ──▶ route layers… ──▶ handler
//!                  │                   │
//!                  └── or Response ◀───┘   (short-circuit, handler never runs)
//! ```
//!
//! Ordering is caller-defined. The usual composition for a server-rendered
//! app: [`InitLocals`] and [`FlashMessages`] as router-level layers so every
//! page gets navigation and notifications, guards as route-level layers on
//! protected routes only.
//!
//! ```rust,no_run
//! use portico::middleware::{Chain, FlashMessages, InitLocals, RequireUser};
//! use portico::{Method, Request, Response, Router};
//!
//! # async fn home(_: Request) -> Response { Response::text("") }
//! # async fn manage(_: Request) -> Response { Response::text("") }
//! # let organizations = vec![];
//! let app = Router::new()
//!     .layer(InitLocals::new(organizations))
//!     .layer(FlashMessages)
//!     .on(Method::Get, "/", home)
//!     .route(Method::Get, "/manage/{username}", Chain::new(manage).layer(RequireUser));
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::handler::{BoxedHandler, Handler};
use crate::request::Request;
use crate::response::Response;

mod flash;
mod guards;
mod locals;

pub use flash::FlashMessages;
pub use guards::{
    Authenticated, RequireAdminUser, RequireGithubAuthentication, RequireUser, SIGN_IN_PATH,
    authenticate,
};
pub use locals::{InitLocals, nav_links};

/// The boxed future a middleware returns.
///
/// Unlike a handler's future this one borrows: it captures `&self` and the
/// [`Next`] continuation's view of the rest of the chain, both alive for the
/// duration of the call.
pub type MiddlewareFuture<'a> = Pin<Box<dyn Future<Output = Response> + Send + 'a>>;

/// A link in the request-processing chain.
///
/// Implementations are plain structs — construction is where configuration
/// gets injected (see [`InitLocals::new`]). The body either awaits
/// `next.run(req)` or returns its own terminating [`Response`]:
///
/// ```rust
/// use portico::middleware::{Middleware, MiddlewareFuture, Next};
/// use portico::{Request, Response};
///
/// struct RequireTls;
///
/// impl Middleware for RequireTls {
///     fn call<'a>(&'a self, req: Request, next: Next<'a>) -> MiddlewareFuture<'a> {
///         Box::pin(async move {
///             if req.header("x-forwarded-proto") != Some("https") {
///                 return Response::redirect("/");
///             }
///             next.run(req).await
///         })
///     }
/// }
/// ```
pub trait Middleware: Send + Sync + 'static {
    fn call<'a>(&'a self, req: Request, next: Next<'a>) -> MiddlewareFuture<'a>;
}

/// A type-erased middleware shared across concurrent requests.
pub(crate) type BoxedMiddleware = Arc<dyn Middleware>;

// ── Next ──────────────────────────────────────────────────────────────────────

/// The continuation handed to a middleware.
///
/// Holds the chain's remaining position: router-level layers run first in
/// registration order, then route-level layers, then the terminal handler.
/// `run` consumes the continuation — a middleware continues at most once.
pub struct Next<'a> {
    layers: &'a [BoxedMiddleware],
    route: &'a [BoxedMiddleware],
    idx: usize,
    handler: &'a BoxedHandler,
}

impl<'a> Next<'a> {
    /// Runs the rest of the chain and returns the eventual response.
    pub async fn run(self, req: Request) -> Response {
        let Next { layers, route, idx, handler } = self;
        let current = if idx < layers.len() {
            layers.get(idx)
        } else {
            route.get(idx - layers.len())
        };
        match current {
            Some(mw) => {
                let next = Next { layers, route, idx: idx + 1, handler };
                mw.call(req, next).await
            }
            None => handler.call(req).await,
        }
    }
}

// ── Chain ─────────────────────────────────────────────────────────────────────

/// A route endpoint: a terminal handler plus its route-level middleware.
///
/// Layers run in the order they are added:
///
/// ```rust,no_run
/// # use portico::middleware::{Chain, RequireGithubAuthentication, RequireUser};
/// # use portico::{Request, Response};
/// # async fn manage(_: Request) -> Response { Response::text("") }
/// // RequireUser first, then RequireGithubAuthentication, then `manage`.
/// Chain::new(manage)
///     .layer(RequireUser)
///     .layer(RequireGithubAuthentication);
/// ```
pub struct Chain {
    stack: Vec<BoxedMiddleware>,
    handler: BoxedHandler,
}

impl Chain {
    pub fn new(handler: impl Handler) -> Self {
        Self { stack: Vec::new(), handler: handler.into_boxed_handler() }
    }

    /// Appends a route-level middleware. Returns `self` for chaining.
    pub fn layer(mut self, middleware: impl Middleware) -> Self {
        self.stack.push(Arc::new(middleware));
        self
    }

    /// Runs `layers`, then this chain's own stack, then the handler.
    pub(crate) async fn run(&self, layers: &[BoxedMiddleware], req: Request) -> Response {
        Next { layers, route: &self.stack, idx: 0, handler: &self.handler }
            .run(req)
            .await
    }
}
