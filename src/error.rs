//! Unified error type.

use std::path::PathBuf;

/// The error type returned by portico's fallible operations.
///
/// Application-level outcomes (404, redirects, validation failures) are
/// expressed as HTTP [`Response`](crate::Response) values, not as `Error`s.
/// This type surfaces infrastructure failures: binding a port, accepting a
/// connection, or loading configuration at startup.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file could not be read.
    #[error("reading config `{}`: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file exists but is not valid TOML for [`Config`].
    ///
    /// Surfaced before the server starts — malformed organization entries are
    /// a deploy-time failure, never a per-request one.
    ///
    /// [`Config`]: crate::Config
    #[error("parsing config `{}`: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
