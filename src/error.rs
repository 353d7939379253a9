use thiserror::Error;

use crate::tree::NodeId;

/// Errors reported by tree, ensemble and search-space operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomTreeError {
    /// An id does not name an existing node, tree or feature.
    #[error("{kind} id {id} out of range (len {len})")]
    OutOfRange {
        kind: &'static str,
        id: usize,
        len: usize,
    },

    /// The operation is not defined for this kind of node.
    #[error("invalid operation on node {node}: {reason}")]
    InvalidOperation { node: NodeId, reason: &'static str },

    /// Decoding did not produce a well-formed tree or ensemble.
    #[error("malformed encoding: {0}")]
    MalformedEncoding(String),
}

impl DomTreeError {
    pub(crate) fn node_out_of_range(id: NodeId, len: usize) -> Self {
        DomTreeError::OutOfRange {
            kind: "node",
            id,
            len,
        }
    }

    pub(crate) fn feature_out_of_range(id: usize, len: usize) -> Self {
        DomTreeError::OutOfRange {
            kind: "feature",
            id,
            len,
        }
    }

    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        DomTreeError::MalformedEncoding(msg.into())
    }
}

impl From<serde_json::Error> for DomTreeError {
    fn from(err: serde_json::Error) -> Self {
        DomTreeError::MalformedEncoding(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DomTreeError>;
