//! Minimal portico example — a server-rendered member portal.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example portal
//!
//! Try (keep the cookie jar so the session sticks):
//!   curl -c /tmp/jar -b /tmp/jar http://localhost:3000/
//!   curl -c /tmp/jar -b /tmp/jar -L http://localhost:3000/auth/saml
//!   curl -c /tmp/jar -b /tmp/jar http://localhost:3000/members/acme
//!   curl -c /tmp/jar -b /tmp/jar http://localhost:3000/healthz

use portico::middleware::{
    Chain, FlashMessages, InitLocals, RequireAdminUser, RequireGithubAuthentication, RequireUser,
};
use portico::{Category, Config, Method, Organization, Request, Response, Router, Server, User, health};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = Config::from_env().expect("config error");
    let organizations = if config.github.organizations.is_empty() {
        // Something to look at when running without a portico.toml.
        vec![
            Organization { name: "acme".to_owned() },
            Organization { name: "beta".to_owned() },
        ]
    } else {
        config.github.organizations
    };

    let app = Router::new()
        .layer(InitLocals::new(organizations))
        .layer(FlashMessages)
        .on(Method::Get, "/", home)
        .on(Method::Get, "/auth/saml", sign_in)
        .on(Method::Get, "/auth/signout", sign_out)
        .route(
            Method::Get,
            "/manage/{username}",
            Chain::new(manage).layer(RequireUser).layer(RequireGithubAuthentication),
        )
        .route(
            Method::Get,
            "/members/{org}",
            Chain::new(members).layer(RequireUser).layer(RequireAdminUser),
        )
        .on(Method::Get, "/healthz", health::liveness)
        .on(Method::Get, "/readyz", health::readiness);

    Server::bind(&config.listen).serve(app).await.expect("server error");
}

// GET /
//
// A real app would hand req.locals() to its template engine; this demo
// renders the navigation and flash messages by hand.
async fn home(req: Request) -> Response {
    let mut page = String::from("<nav>");
    if let Some(links) = req.locals().get("navLinks").and_then(|v| v.as_array()) {
        for link in links {
            let href = link["href"].as_str().unwrap_or("/");
            let label = link["label"].as_str().unwrap_or("?");
            page.push_str(&format!(r#"<a href="{href}">{label}</a> "#));
        }
    }
    page.push_str("</nav>");

    match req.locals().get("messages") {
        Some(messages) if messages.is_object() => {
            page.push_str(&format!("<aside>{messages}</aside>"));
        }
        _ => {} // `false`: nothing to show
    }

    Response::html(page)
}

// GET /auth/saml
//
// Stands in for the identity provider. A real deployment redirects here and
// comes back with a SAML assertion; the demo just signs in a canned admin.
async fn sign_in(req: Request) -> Response {
    req.session().sign_in(User::admin("demo").with_github("octo"));
    req.session().flash(Category::Success, "signed in as demo");
    Response::redirect("/")
}

// GET /auth/signout
async fn sign_out(req: Request) -> Response {
    req.session().sign_out();
    req.session().flash(Category::Info, "signed out");
    Response::redirect("/")
}

// GET /manage/{username} — behind RequireUser + RequireGithubAuthentication
async fn manage(req: Request) -> Response {
    let username = req.param("username").unwrap_or("unknown");
    Response::html(format!("<h1>Organizations for {username}</h1>"))
}

// GET /members/{org} — behind RequireUser + RequireAdminUser
async fn members(req: Request) -> Response {
    let org = req.param("org").unwrap_or("unknown");
    Response::html(format!("<h1>Members of {org}</h1>"))
}
