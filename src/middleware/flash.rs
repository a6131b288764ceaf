//! Flash-message collection.
//!
//! Handlers queue notifications on the session; this middleware drains them
//! into the `messages` local for the page being rendered. The drain is
//! destructive — that is the point of a flash message.

use serde_json::Value;
use tracing::error;

use crate::middleware::{Middleware, MiddlewareFuture, Next};
use crate::request::Request;

/// Drains the session's flash queues into the `messages` local.
///
/// `messages` is JSON `false` when all four categories are empty, otherwise
/// an object with `info` / `success` / `warning` / `error` keys each holding
/// its ordered list. Template layers branch on the `false` to skip the
/// notification block entirely.
///
/// Always continues the chain.
pub struct FlashMessages;

impl Middleware for FlashMessages {
    fn call<'a>(&'a self, mut req: Request, next: Next<'a>) -> MiddlewareFuture<'a> {
        Box::pin(async move {
            let drained = req.session().drain_all();
            let messages = if drained.is_empty() {
                Value::Bool(false)
            } else {
                serde_json::to_value(&drained).unwrap_or_else(|e| {
                    error!("failed to serialize flash messages: {e}");
                    Value::Bool(false)
                })
            };
            req.locals_mut().insert("messages", messages);
            next.run(req).await
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::middleware::Chain;
    use crate::request::testing::request_with_session;
    use crate::response::Response;
    use crate::session::{Category, SessionStore};

    /// A chain whose handler echoes the `messages` local as its JSON body.
    fn echo_messages() -> Chain {
        Chain::new(|req: Request| async move {
            Response::json(serde_json::to_vec(req.locals().get("messages").unwrap()).unwrap())
        })
        .layer(FlashMessages)
    }

    async fn messages_for(chain: &Chain, session: &crate::session::Session) -> Value {
        let res = chain.run(&[], request_with_session("/", session.clone())).await;
        serde_json::from_slice(res.body()).unwrap()
    }

    #[tokio::test]
    async fn queued_messages_appear_once_then_drain_to_false() {
        let store = SessionStore::new();
        let (session, _) = store.open(None);
        session.flash(Category::Success, "profile saved");
        session.flash(Category::Error, "quota exceeded");

        let chain = echo_messages();

        let first = messages_for(&chain, &session).await;
        assert_eq!(
            first,
            json!({
                "info": [],
                "success": ["profile saved"],
                "warning": [],
                "error": ["quota exceeded"],
            })
        );

        // Second request in the same session: the queues were cleared.
        let second = messages_for(&chain, &session).await;
        assert_eq!(second, Value::Bool(false));
    }

    #[tokio::test]
    async fn empty_queues_yield_false_not_an_empty_object() {
        let store = SessionStore::new();
        let (session, _) = store.open(None);

        let value = messages_for(&echo_messages(), &session).await;
        assert_eq!(value, Value::Bool(false));
    }

    #[tokio::test]
    async fn one_nonempty_category_is_enough_for_an_object() {
        let store = SessionStore::new();
        let (session, _) = store.open(None);
        session.flash(Category::Info, "heads up");

        let value = messages_for(&echo_messages(), &session).await;
        assert_eq!(value["info"], json!(["heads up"]));
        assert_eq!(value["success"], json!([]));
    }
}
