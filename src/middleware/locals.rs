//! View-locals initialization.
//!
//! Every rendered page needs the header navigation and the current user.
//! [`InitLocals`] puts both into the request's [`Locals`] so the terminal
//! handler can hand them straight to the template layer.

use crate::config::Organization;
use crate::middleware::{Middleware, MiddlewareFuture, Next};
use crate::request::Request;
use crate::user::User;
use crate::view::NavLink;

/// Builds the `navLinks` and `user` locals.
///
/// The organization list is injected at construction — load it from
/// [`Config`](crate::Config) once at startup:
///
/// ```rust,no_run
/// # use portico::middleware::InitLocals;
/// # use portico::Config;
/// let config = Config::from_env()?;
/// let locals = InitLocals::new(config.github.organizations);
/// # Ok::<(), portico::Error>(())
/// ```
///
/// Always continues the chain; an anonymous request is a valid, expected
/// state and still gets its `Home` link.
pub struct InitLocals {
    organizations: Vec<Organization>,
}

impl InitLocals {
    pub fn new(organizations: Vec<Organization>) -> Self {
        Self { organizations }
    }
}

impl Middleware for InitLocals {
    fn call<'a>(&'a self, mut req: Request, next: Next<'a>) -> MiddlewareFuture<'a> {
        Box::pin(async move {
            let links = nav_links(req.user(), &self.organizations);
            let user = req.user().cloned();
            let locals = req.locals_mut();
            locals.insert("navLinks", links);
            locals.insert("user", user);
            next.run(req).await
        })
    }
}

/// The header navigation for a given user.
///
/// `Home` always comes first. A user with a linked GitHub account gets a
/// link to their own organization management page; an admin additionally
/// gets one link per configured organization, in configuration order.
pub fn nav_links(user: Option<&User>, organizations: &[Organization]) -> Vec<NavLink> {
    let mut links = vec![NavLink::new("Home", "home", "/")];

    let Some(user) = user else {
        return links;
    };

    if let Some(github) = &user.github {
        links.push(NavLink::new(
            "My Organizations",
            "manage",
            format!("/manage/{}", github.username),
        ));
    }

    if user.is_admin {
        for org in organizations {
            links.push(NavLink::new(
                org.name.clone(),
                format!("members/{}", org.name),
                format!("/members/{}", org.name),
            ));
        }
    }

    links
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::middleware::Chain;
    use crate::request::testing::{request, request_as};
    use crate::response::Response;

    fn orgs(names: &[&str]) -> Vec<Organization> {
        names.iter().map(|n| Organization { name: (*n).to_owned() }).collect()
    }

    fn home() -> NavLink {
        NavLink::new("Home", "home", "/")
    }

    #[test]
    fn anonymous_gets_exactly_the_home_link() {
        assert_eq!(nav_links(None, &orgs(&["acme"])), vec![home()]);
    }

    #[test]
    fn github_link_comes_right_after_home() {
        let user = User::new("alice").with_github("octo");
        let links = nav_links(Some(&user), &[]);
        assert_eq!(
            links,
            vec![home(), NavLink::new("My Organizations", "manage", "/manage/octo")]
        );
    }

    #[test]
    fn admin_gets_one_link_per_organization_in_config_order() {
        let user = User::admin("root");
        let links = nav_links(Some(&user), &orgs(&["acme", "beta"]));
        assert_eq!(
            links,
            vec![
                home(),
                NavLink::new("acme", "members/acme", "/members/acme"),
                NavLink::new("beta", "members/beta", "/members/beta"),
            ]
        );
    }

    #[test]
    fn admin_with_github_gets_manage_before_org_links() {
        let user = User::admin("root").with_github("octo");
        let links = nav_links(Some(&user), &orgs(&["acme"]));
        let keys: Vec<_> = links.iter().map(|l| l.key.as_str()).collect();
        assert_eq!(keys, ["home", "manage", "members/acme"]);
    }

    #[test]
    fn non_admin_sees_no_org_links() {
        let user = User::new("bob");
        assert_eq!(nav_links(Some(&user), &orgs(&["acme", "beta"])), vec![home()]);
    }

    #[tokio::test]
    async fn middleware_fills_locals_and_continues() {
        let chain = Chain::new(|req: Request| async move {
            // Echo the locals back so the test can inspect what the renderer
            // would have received.
            let links = req.locals().get("navLinks").cloned();
            let user = req.locals().get("user").cloned();
            Response::json(
                serde_json::to_vec(&json!({"navLinks": links, "user": user})).unwrap(),
            )
        })
        .layer(InitLocals::new(orgs(&["acme"])));

        let user = User::admin("root").with_github("octo");
        let res = chain.run(&[], request_as("/", user)).await;
        let body: serde_json::Value = serde_json::from_slice(res.body()).unwrap();

        assert_eq!(body["user"]["name"], "root");
        assert_eq!(body["navLinks"][0]["key"], "home");
        assert_eq!(body["navLinks"][1]["href"], "/manage/octo");
        assert_eq!(body["navLinks"][2]["label"], "acme");
    }

    #[tokio::test]
    async fn anonymous_request_serializes_user_as_null() {
        let chain = Chain::new(|req: Request| async move {
            Response::json(serde_json::to_vec(req.locals().get("user").unwrap()).unwrap())
        })
        .layer(InitLocals::new(Vec::new()));

        let res = chain.run(&[], request("/")).await;
        assert_eq!(res.body(), b"null");
    }
}
