//! # portico
//!
//! Request middleware for server-rendered Rust web apps.
//! Nothing more. Nothing less.
//!
//! ## The contract
//!
//! Your template engine renders pages. Your identity provider authenticates
//! people. portico owns the strip in between — the per-request pipeline that
//! decides whether a request reaches its page and what shared data the page
//! renders with:
//!
//! - **View locals** — [`middleware::InitLocals`] injects the header
//!   navigation and the current user into every page's render data.
//! - **Flash messages** — [`middleware::FlashMessages`] drains one-shot,
//!   session-stored notifications, exactly once per request.
//! - **Guards** — [`middleware::RequireUser`],
//!   [`middleware::RequireGithubAuthentication`] and
//!   [`middleware::RequireAdminUser`] bounce requests that do not belong, via
//!   redirect, never an error page.
//!
//! The HTTP plumbing underneath (router, server, sessions) is carried so the
//! middleware has something real to compose into: radix-tree routing via
//! [`matchit`], hyper + tokio connection handling, graceful shutdown, and an
//! in-process session store behind a `sid` cookie.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use portico::middleware::{Chain, FlashMessages, InitLocals, RequireAdminUser, RequireUser};
//! use portico::{Config, Method, Request, Response, Router, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), portico::Error> {
//!     let config = Config::from_env()?;
//!
//!     let app = Router::new()
//!         .layer(InitLocals::new(config.github.organizations))
//!         .layer(FlashMessages)
//!         .on(Method::Get, "/", home)
//!         .route(
//!             Method::Get,
//!             "/members/{org}",
//!             Chain::new(members).layer(RequireUser).layer(RequireAdminUser),
//!         );
//!
//!     Server::bind(&config.listen).serve(app).await
//! }
//!
//! async fn home(req: Request) -> Response {
//!     // Hand req.locals() to your template engine here.
//!     Response::html(format!("{} locals set", req.locals().len()))
//! }
//!
//! async fn members(req: Request) -> Response {
//!     let org = req.param("org").unwrap_or("unknown");
//!     Response::html(format!("<h1>{org} members</h1>"))
//! }
//! ```

mod config;
mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod session;
mod status;
mod user;
mod view;

pub mod health;
pub mod middleware;

pub use config::{CONFIG_PATH_VAR, Config, GithubConfig, Organization};
pub use error::Error;
pub use handler::Handler;
pub use method::Method;
pub use request::Request;
pub use response::{ContentType, IntoResponse, Response};
pub use router::Router;
pub use server::Server;
pub use session::{Category, Flash, Session, SessionStore};
pub use status::Status;
pub use user::{GithubAccount, User};
pub use view::{Locals, NavLink};
