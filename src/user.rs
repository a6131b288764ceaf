//! The signed-in user as the middleware layer sees it.
//!
//! A `User` is attached to the [`Request`](crate::Request) by the session
//! layer before any middleware runs, and is read-only from then on. Who puts
//! it *into* the session — a SAML assertion handler, an OAuth callback, a
//! dev-mode stub — is outside this crate's contract.

use serde::{Deserialize, Serialize};

/// The authenticated user attached to a request.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct User {
    /// Display name.
    pub name: String,
    /// Admin accounts see the per-organization member pages.
    pub is_admin: bool,
    /// `Some` once the account has been linked to GitHub.
    ///
    /// An `Option` rather than an `is_configured` flag — "linked but no
    /// username" is not a representable state.
    pub github: Option<GithubAccount>,
}

/// A linked GitHub identity.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct GithubAccount {
    pub username: String,
}

impl User {
    /// A user with nothing linked and no privileges.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), is_admin: false, github: None }
    }

    pub fn admin(name: impl Into<String>) -> Self {
        Self { name: name.into(), is_admin: true, github: None }
    }

    /// Links a GitHub account. Returns `self` for chaining.
    pub fn with_github(mut self, username: impl Into<String>) -> Self {
        self.github = Some(GithubAccount { username: username.into() });
        self
    }
}
