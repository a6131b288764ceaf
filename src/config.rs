//! Startup configuration.
//!
//! Loaded once from a TOML file, then handed to the pieces that need it by
//! value — [`InitLocals::new`](crate::middleware::InitLocals::new) takes the
//! organization list directly rather than reaching into a global accessor.
//! Nothing in this crate reads configuration after startup.
//!
//! ```toml
//! listen = "0.0.0.0:3000"
//!
//! [[github.organizations]]
//! name = "acme"
//!
//! [[github.organizations]]
//! name = "beta"
//! ```
//!
//! A malformed file — including an organization entry without a `name` — is
//! rejected at load time with [`Error::ConfigParse`]. The server never starts
//! on bad configuration.

use std::env;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Path env var consulted by [`Config::from_env`].
pub const CONFIG_PATH_VAR: &str = "PORTICO_CONFIG";

const DEFAULT_PATH: &str = "portico.toml";
const DEFAULT_LISTEN: &str = "127.0.0.1:3000";

/// Top-level application configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    /// `host:port` the server binds to.
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default)]
    pub github: GithubConfig,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct GithubConfig {
    /// Organizations shown to admins, in the order they appear here.
    #[serde(default)]
    pub organizations: Vec<Organization>,
}

/// One GitHub organization the portal manages.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Organization {
    pub name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self { listen: default_listen(), github: GithubConfig::default() }
    }
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_owned(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| Error::ConfigParse {
            path: path.to_owned(),
            source,
        })
    }

    /// Loads from the path in `PORTICO_CONFIG`, falling back to
    /// `portico.toml`, falling back to defaults when neither file exists.
    ///
    /// A file that exists but fails to parse is still an error — only a
    /// *missing* file means "run with defaults".
    pub fn from_env() -> Result<Self, Error> {
        let explicit = env::var(CONFIG_PATH_VAR).ok();
        let path = explicit.as_deref().unwrap_or(DEFAULT_PATH);
        if !Path::new(path).exists() {
            // An explicitly named file must exist; the default one may not.
            if explicit.is_some() {
                return Err(Error::ConfigRead {
                    path: path.into(),
                    source: std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        "config file not found",
                    ),
                });
            }
            return Ok(Self::default());
        }
        Self::load(path)
    }
}

fn default_listen() -> String {
    DEFAULT_LISTEN.to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_organizations_in_order() {
        let cfg: Config = toml::from_str(
            r#"
            listen = "0.0.0.0:8080"

            [[github.organizations]]
            name = "acme"

            [[github.organizations]]
            name = "beta"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.listen, "0.0.0.0:8080");
        let names: Vec<_> = cfg.github.organizations.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, ["acme", "beta"]);
    }

    #[test]
    fn empty_file_yields_defaults() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(cfg.listen, DEFAULT_LISTEN);
        assert!(cfg.github.organizations.is_empty());
    }

    #[test]
    fn organization_without_name_is_rejected() {
        let err = toml::from_str::<Config>(
            r#"
            [[github.organizations]]
            url = "https://github.com/acme"
            "#,
        );
        assert!(err.is_err());
    }
}
