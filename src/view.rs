//! Per-request render data.
//!
//! portico does not render anything. It fills a [`Locals`] map as the request
//! moves through the middleware chain; the terminal handler hands that map to
//! whatever template engine the application uses. The built-in middleware
//! populate three keys:
//!
//! | Key | Value |
//! |---|---|
//! | `navLinks` | ordered array of [`NavLink`] |
//! | `user` | the signed-in [`User`](crate::User), or `null` |
//! | `messages` | flash messages by category, or `false` when there are none |

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;
use tracing::error;

/// One entry in the header navigation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NavLink {
    pub label: String,
    pub key: String,
    pub href: String,
}

impl NavLink {
    pub fn new(
        label: impl Into<String>,
        key: impl Into<String>,
        href: impl Into<String>,
    ) -> Self {
        Self { label: label.into(), key: key.into(), href: href.into() }
    }
}

/// String-keyed render data, scoped to one request.
///
/// Values are stored as [`serde_json::Value`] so the map can hold anything a
/// template layer understands, including the `false`-or-object shape of the
/// `messages` key.
#[derive(Debug, Default)]
pub struct Locals {
    values: HashMap<String, Value>,
}

impl Locals {
    /// Serializes `value` and stores it under `key`, replacing any previous
    /// entry.
    ///
    /// Serialization of a plain data type does not fail in practice; if it
    /// ever does the entry is stored as `null` and the failure is logged
    /// rather than taking the request down.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Serialize) {
        let key = key.into();
        let value = match serde_json::to_value(value) {
            Ok(v) => v,
            Err(e) => {
                error!(key = %key, "failed to serialize view local: {e}");
                Value::Null
            }
        };
        self.values.insert(key, value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Iterates over all entries, for handing the whole map to a renderer.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn insert_replaces_previous_entry() {
        let mut locals = Locals::default();
        locals.insert("user", json!({"name": "alice"}));
        locals.insert("user", Value::Null);
        assert_eq!(locals.get("user"), Some(&Value::Null));
        assert_eq!(locals.len(), 1);
    }

    #[test]
    fn nav_links_serialize_with_js_field_names() {
        let link = NavLink::new("Home", "home", "/");
        assert_eq!(
            serde_json::to_value(&link).unwrap(),
            json!({"label": "Home", "key": "home", "href": "/"})
        );
    }
}
