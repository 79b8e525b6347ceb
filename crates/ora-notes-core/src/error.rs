//! Error taxonomy for the indexing engine.
//!
//! Every [`Index`](crate::index::Index) operation either succeeds fully or
//! returns one of these variants. An empty result set is never an error.

use std::path::PathBuf;

use thiserror::Error;

pub type IndexResult<T> = std::result::Result<T, IndexError>;

#[derive(Error, Debug)]
pub enum IndexError {
    /// Invalid caller input or configuration, e.g. a note with an empty ID.
    #[error("configuration error: {0}")]
    Config(String),

    /// Filesystem failure while preparing or touching the index root.
    #[error("{op} {}: {source}", path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The query could not be turned into a backend query.
    #[error("invalid query: {0}")]
    Query(String),

    /// The storage backend rejected an operation.
    #[error("index backend error at {}: {source}", path.display())]
    Backend {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl IndexError {
    pub fn io(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        IndexError::Io {
            op,
            path: path.into(),
            source,
        }
    }

    pub fn backend<E>(path: impl Into<PathBuf>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        IndexError::Backend {
            path: path.into(),
            source: Box::new(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_names_operation_and_path() {
        let err = IndexError::io(
            "create dir",
            "/tmp/ora/index",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("create dir"));
        assert!(msg.contains("/tmp/ora/index"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn backend_error_keeps_source() {
        let err = IndexError::backend(
            "/var/idx",
            std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        );
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("/var/idx"));
    }
}
