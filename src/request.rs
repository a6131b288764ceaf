//! Incoming HTTP request type.
//!
//! Beyond the parsed wire data, a `Request` carries the three per-request
//! pieces the middleware chain works with:
//!
//! - the optional signed-in [`User`], resolved from the session before any
//!   middleware runs and read-only from then on;
//! - the [`Session`] handle, which backs flash messages and sign-in;
//! - the [`Locals`] render data, filled by middleware and consumed by the
//!   terminal handler.

use std::collections::HashMap;

use crate::method::Method;
use crate::session::{Category, Session};
use crate::user::User;
use crate::view::Locals;

/// An incoming HTTP request plus its per-request state.
pub struct Request {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Vec<u8>,
    pub(crate) params: HashMap<String, String>,
    pub(crate) user: Option<User>,
    pub(crate) session: Session,
    pub(crate) locals: Locals,
}

impl Request {
    pub(crate) fn new(
        method: Method,
        path: String,
        headers: Vec<(String, String)>,
        body: Vec<u8>,
        params: HashMap<String, String>,
        session: Session,
    ) -> Self {
        let user = session.user();
        Self {
            method,
            path,
            headers,
            body,
            params,
            user,
            session,
            locals: Locals::default(),
        }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/manage/{username}`, `req.param("username")` on
    /// `/manage/octo` returns `Some("octo")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// The signed-in user, if the session has one. Read-only by design:
    /// attaching a user is the session layer's job, not a middleware's.
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Drains one flash category — read-then-clear, see
    /// [`Session::drain`].
    pub fn flash(&self, category: Category) -> Vec<String> {
        self.session.drain(category)
    }

    pub fn locals(&self) -> &Locals {
        &self.locals
    }

    pub fn locals_mut(&mut self) -> &mut Locals {
        &mut self.locals
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Request construction for unit tests, where there is no wire to parse.

    use super::*;
    use crate::session::SessionStore;

    /// A GET request with a fresh session and no user.
    pub(crate) fn request(path: &str) -> Request {
        request_with_session(path, SessionStore::new().open(None).0)
    }

    pub(crate) fn request_with_session(path: &str, session: Session) -> Request {
        Request::new(
            Method::Get,
            path.to_owned(),
            Vec::new(),
            Vec::new(),
            HashMap::new(),
            session,
        )
    }

    pub(crate) fn request_as(path: &str, user: User) -> Request {
        let session = SessionStore::new().open(None).0;
        session.sign_in(user);
        request_with_session(path, session)
    }
}

#[cfg(test)]
mod tests {
    use super::testing::request_with_session;
    use crate::session::{Category, SessionStore};

    #[test]
    fn flash_drains_one_category_through_the_request() {
        let (session, _) = SessionStore::new().open(None);
        session.flash(Category::Warning, "disk almost full");
        session.flash(Category::Info, "unrelated");

        let req = request_with_session("/", session);

        assert_eq!(req.flash(Category::Warning), vec!["disk almost full"]);
        // One-shot: drained messages are gone, other categories untouched.
        assert!(req.flash(Category::Warning).is_empty());
        assert_eq!(req.flash(Category::Info), vec!["unrelated"]);
    }
}
