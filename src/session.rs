//! In-process sessions and flash-message storage.
//!
//! Sessions are keyed by a random id carried in the `sid` cookie. Each
//! session holds the signed-in user (if any) and four categorized flash
//! queues. The store lives for the process; there is no persistence and no
//! cross-process sharing — put sticky sessions or a single replica in front
//! of this, the same way you would for any in-memory session store.
//!
//! Flash messages are one-shot: a handler queues them with
//! [`Session::flash`], the next rendered page drains them with
//! [`Session::drain_all`], and a second drain within the same session comes
//! back empty. The whole drain happens under one lock acquisition, so a
//! message is delivered exactly once even if two requests for the same
//! session race.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use uuid::Uuid;

use crate::user::User;

/// Flash-message category.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Category {
    Info,
    Success,
    Warning,
    Error,
}

/// The four flash queues, in fixed category order.
///
/// Doubles as session storage and as the result of [`Session::drain_all`].
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Flash {
    pub info: Vec<String>,
    pub success: Vec<String>,
    pub warning: Vec<String>,
    pub error: Vec<String>,
}

impl Flash {
    pub fn is_empty(&self) -> bool {
        self.info.is_empty()
            && self.success.is_empty()
            && self.warning.is_empty()
            && self.error.is_empty()
    }

    fn queue(&mut self, category: Category) -> &mut Vec<String> {
        match category {
            Category::Info    => &mut self.info,
            Category::Success => &mut self.success,
            Category::Warning => &mut self.warning,
            Category::Error   => &mut self.error,
        }
    }
}

#[derive(Default)]
struct SessionData {
    user: Option<User>,
    flash: Flash,
}

type Sessions = Arc<Mutex<HashMap<String, SessionData>>>;

/// Process-wide session store. Cheap to clone; clones share the same map.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Sessions,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves a session from a cookie value.
    ///
    /// Returns the session handle and whether the id was freshly issued —
    /// the server sets the `sid` cookie only for fresh ids. A malformed or
    /// absent id yields a new one rather than an error: expired cookies are
    /// an everyday state, not a failure.
    ///
    /// Opening never allocates store space. The map gains an entry only when
    /// something is written through the handle (`sign_in`, `flash`), so
    /// cookie-less crawler traffic cannot grow the store. A well-formed id
    /// that has no entry — nothing was ever written, or the data was evicted
    /// by a restart — is simply reused.
    pub fn open(&self, id: Option<&str>) -> (Session, bool) {
        if let Some(id) = id
            && Uuid::try_parse(id).is_ok()
        {
            return (self.session(id.to_owned()), false);
        }
        (self.session(Uuid::new_v4().to_string()), true)
    }

    fn session(&self, id: String) -> Session {
        Session { id, sessions: Arc::clone(&self.sessions) }
    }

    /// Number of sessions holding data.
    #[cfg(test)]
    pub(crate) fn stored(&self) -> usize {
        lock(&self.sessions).len()
    }
}

/// A handle to one session's data.
///
/// Clones share the same underlying entry, so a handle can be kept by a test
/// or a login flow while requests operate on their own copies.
#[derive(Clone)]
pub struct Session {
    id: String,
    sessions: Sessions,
}

impl Session {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The signed-in user, if any.
    pub fn user(&self) -> Option<User> {
        lock(&self.sessions).get(&self.id).and_then(|d| d.user.clone())
    }

    /// Records `user` as signed in for this session.
    pub fn sign_in(&self, user: User) {
        lock(&self.sessions).entry(self.id.clone()).or_default().user = Some(user);
    }

    pub fn sign_out(&self) {
        if let Some(data) = lock(&self.sessions).get_mut(&self.id) {
            data.user = None;
        }
    }

    /// Queues a flash message for the next rendered page.
    pub fn flash(&self, category: Category, message: impl Into<String>) {
        lock(&self.sessions)
            .entry(self.id.clone())
            .or_default()
            .flash
            .queue(category)
            .push(message.into());
    }

    /// Drains one category: returns its messages and clears the queue.
    pub fn drain(&self, category: Category) -> Vec<String> {
        lock(&self.sessions)
            .get_mut(&self.id)
            .map(|d| std::mem::take(d.flash.queue(category)))
            .unwrap_or_default()
    }

    /// Drains all four categories in one lock acquisition.
    pub fn drain_all(&self) -> Flash {
        lock(&self.sessions)
            .get_mut(&self.id)
            .map(|d| std::mem::take(&mut d.flash))
            .unwrap_or_default()
    }
}

/// A poisoned lock means another request panicked mid-update; session data is
/// simple enough that continuing with whatever is there beats taking every
/// subsequent request down.
fn lock(sessions: &Sessions) -> std::sync::MutexGuard<'_, HashMap<String, SessionData>> {
    sessions.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_without_cookie_creates_a_fresh_session() {
        let store = SessionStore::new();
        let (session, fresh) = store.open(None);
        assert!(fresh);
        assert!(session.user().is_none());
    }

    #[test]
    fn open_with_known_id_reuses_the_session() {
        let store = SessionStore::new();
        let (first, _) = store.open(None);
        first.sign_in(User::new("alice"));

        let (second, fresh) = store.open(Some(first.id()));
        assert!(!fresh);
        assert_eq!(second.user().map(|u| u.name), Some("alice".to_owned()));
    }

    #[test]
    fn open_with_a_malformed_id_issues_a_fresh_one() {
        let store = SessionStore::new();
        let (session, fresh) = store.open(Some("gone"));
        assert!(fresh);
        assert_ne!(session.id(), "gone");
    }

    #[test]
    fn open_allocates_no_entry_until_the_first_write() {
        let store = SessionStore::new();
        let (session, _) = store.open(None);
        assert_eq!(store.stored(), 0);

        // Reads on an unwritten session are free too.
        assert!(session.user().is_none());
        assert!(session.drain_all().is_empty());
        assert_eq!(store.stored(), 0);

        session.flash(Category::Info, "now it exists");
        assert_eq!(store.stored(), 1);
    }

    #[test]
    fn open_with_a_well_formed_unknown_id_reuses_it_without_allocating() {
        let store = SessionStore::new();
        let id = Uuid::new_v4().to_string();

        let (session, fresh) = store.open(Some(&id));

        assert!(!fresh);
        assert_eq!(session.id(), id);
        assert_eq!(store.stored(), 0);
    }

    #[test]
    fn drain_clears_the_queue() {
        let store = SessionStore::new();
        let (session, _) = store.open(None);
        session.flash(Category::Success, "saved");
        session.flash(Category::Success, "twice");

        assert_eq!(session.drain(Category::Success), vec!["saved", "twice"]);
        assert!(session.drain(Category::Success).is_empty());
    }

    #[test]
    fn drain_all_is_destructive_and_ordered() {
        let store = SessionStore::new();
        let (session, _) = store.open(None);
        session.flash(Category::Error, "first");
        session.flash(Category::Error, "second");
        session.flash(Category::Info, "hello");

        let drained = session.drain_all();
        assert_eq!(drained.error, vec!["first", "second"]);
        assert_eq!(drained.info, vec!["hello"]);
        assert!(drained.success.is_empty());

        assert!(session.drain_all().is_empty());
    }

    #[test]
    fn sign_out_keeps_the_session_alive() {
        let store = SessionStore::new();
        let (session, _) = store.open(None);
        session.sign_in(User::admin("root"));
        session.sign_out();
        assert!(session.user().is_none());

        let (_, fresh) = store.open(Some(session.id()));
        assert!(!fresh);
    }
}
