//! Route guards.
//!
//! A guard is a pure decision over request state: continue the chain, or
//! terminate the request with a redirect. Guards do not retry, do not log,
//! and never touch anything beyond the response they return.
//!
//! The decision logic is exposed as plain functions around the
//! [`Authenticated`] witness. The witness can only be produced by
//! [`authenticate`], so code calling [`Authenticated::github_linked`] or
//! [`Authenticated::admin`] directly has proven, at compile time, that the
//! authentication check ran first. The middleware adapters compose the same
//! functions, which is why an anonymous request hitting a downstream guard is
//! bounced to sign-in instead of blowing up on a missing user.

use crate::middleware::{Middleware, MiddlewareFuture, Next};
use crate::request::Request;
use crate::response::Response;
use crate::user::User;

/// Where unauthenticated requests get sent: the identity provider's login
/// endpoint.
pub const SIGN_IN_PATH: &str = "/auth/saml";

// ── Decision functions ────────────────────────────────────────────────────────

/// Proof that the request carries a signed-in user.
///
/// Only [`authenticate`] constructs this, and the downstream checks are
/// methods on it — there is no way to ask "is this user an admin?" without
/// first having answered "is there a user?".
pub struct Authenticated<'a> {
    user: &'a User,
}

/// The authentication decision: a witness for signed-in requests, a redirect
/// to [`SIGN_IN_PATH`] for anonymous ones.
pub fn authenticate(user: Option<&User>) -> Result<Authenticated<'_>, Response> {
    match user {
        Some(user) => Ok(Authenticated { user }),
        None => Err(Response::redirect(SIGN_IN_PATH)),
    }
}

impl<'a> Authenticated<'a> {
    pub fn user(&self) -> &'a User {
        self.user
    }

    /// Continue only for users with a linked GitHub account; everyone else
    /// goes back to the home page.
    pub fn github_linked(&self) -> Result<(), Response> {
        if self.user.github.is_some() {
            Ok(())
        } else {
            Err(Response::redirect("/"))
        }
    }

    /// Continue only for admins; everyone else goes back to the home page.
    pub fn admin(&self) -> Result<(), Response> {
        if self.user.is_admin {
            Ok(())
        } else {
            Err(Response::redirect("/"))
        }
    }
}

// ── Middleware adapters ───────────────────────────────────────────────────────

/// Redirects anonymous requests to [`SIGN_IN_PATH`].
pub struct RequireUser;

impl Middleware for RequireUser {
    fn call<'a>(&'a self, req: Request, next: Next<'a>) -> MiddlewareFuture<'a> {
        Box::pin(async move {
            if let Err(redirect) = authenticate(req.user()).map(|_| ()) {
                return redirect;
            }
            next.run(req).await
        })
    }
}

/// Redirects users without a linked GitHub account to `/`.
///
/// Anonymous requests are redirected to [`SIGN_IN_PATH`] — composing this
/// guard without [`RequireUser`] upstream degrades to a sign-in bounce, never
/// a crash.
pub struct RequireGithubAuthentication;

impl Middleware for RequireGithubAuthentication {
    fn call<'a>(&'a self, req: Request, next: Next<'a>) -> MiddlewareFuture<'a> {
        Box::pin(async move {
            let verdict = authenticate(req.user()).and_then(|auth| auth.github_linked());
            if let Err(redirect) = verdict {
                return redirect;
            }
            next.run(req).await
        })
    }
}

/// Redirects non-admin users to `/`; anonymous requests to [`SIGN_IN_PATH`].
pub struct RequireAdminUser;

impl Middleware for RequireAdminUser {
    fn call<'a>(&'a self, req: Request, next: Next<'a>) -> MiddlewareFuture<'a> {
        Box::pin(async move {
            let verdict = authenticate(req.user()).and_then(|auth| auth.admin());
            if let Err(redirect) = verdict {
                return redirect;
            }
            next.run(req).await
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;
    use crate::middleware::Chain;
    use crate::request::testing::{request, request_as};

    fn guarded(guard: impl Middleware, handled: Arc<AtomicBool>) -> Chain {
        Chain::new(move |_req: Request| {
            let handled = Arc::clone(&handled);
            async move {
                handled.store(true, Ordering::SeqCst);
                Response::text("page")
            }
        })
        .layer(guard)
    }

    #[tokio::test]
    async fn anonymous_is_redirected_to_sign_in() {
        let handled = Arc::new(AtomicBool::new(false));
        let chain = guarded(RequireUser, Arc::clone(&handled));

        let res = chain.run(&[], request("/members/acme")).await;

        assert_eq!(res.status_code(), 302);
        assert_eq!(res.header("location"), Some(SIGN_IN_PATH));
        assert!(!handled.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn signed_in_user_passes_require_user() {
        let handled = Arc::new(AtomicBool::new(false));
        let chain = guarded(RequireUser, Arc::clone(&handled));

        let res = chain.run(&[], request_as("/", User::new("alice"))).await;

        assert_eq!(res.status_code(), 200);
        assert!(!res.is_redirect());
        assert!(handled.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn unlinked_user_is_sent_home_by_github_guard() {
        let handled = Arc::new(AtomicBool::new(false));
        let chain = guarded(RequireGithubAuthentication, Arc::clone(&handled));

        let res = chain.run(&[], request_as("/manage/x", User::new("alice"))).await;

        assert_eq!(res.header("location"), Some("/"));
        assert!(!handled.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn linked_user_passes_github_guard() {
        let handled = Arc::new(AtomicBool::new(false));
        let chain = guarded(RequireGithubAuthentication, Arc::clone(&handled));

        let user = User::new("alice").with_github("octo");
        let res = chain.run(&[], request_as("/manage/octo", user)).await;

        assert_eq!(res.status_code(), 200);
        assert!(handled.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn non_admin_is_sent_home_by_admin_guard() {
        let handled = Arc::new(AtomicBool::new(false));
        let chain = guarded(RequireAdminUser, Arc::clone(&handled));

        let res = chain.run(&[], request_as("/members/acme", User::new("bob"))).await;

        assert_eq!(res.header("location"), Some("/"));
        assert!(!handled.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn admin_passes_admin_guard() {
        let handled = Arc::new(AtomicBool::new(false));
        let chain = guarded(RequireAdminUser, Arc::clone(&handled));

        let res = chain.run(&[], request_as("/members/acme", User::admin("root"))).await;

        assert_eq!(res.status_code(), 200);
        assert!(handled.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn downstream_guard_without_require_user_bounces_to_sign_in() {
        // The misordered composition the witness type exists to prevent:
        // reaching an admin guard anonymously degrades to a sign-in redirect.
        let handled = Arc::new(AtomicBool::new(false));
        let chain = guarded(RequireAdminUser, Arc::clone(&handled));

        let res = chain.run(&[], request("/members/acme")).await;

        assert_eq!(res.header("location"), Some(SIGN_IN_PATH));
        assert!(!handled.load(Ordering::SeqCst));
    }

    #[test]
    fn decision_functions_are_pure_over_user_state() {
        assert!(authenticate(None).is_err());

        let user = User::admin("root").with_github("octo");
        let auth = authenticate(Some(&user)).ok().unwrap();
        assert!(auth.github_linked().is_ok());
        assert!(auth.admin().is_ok());
        assert_eq!(auth.user().name, "root");

        let plain = User::new("bob");
        let auth = authenticate(Some(&plain)).ok().unwrap();
        assert!(auth.github_linked().is_err());
        assert!(auth.admin().is_err());
    }
}
