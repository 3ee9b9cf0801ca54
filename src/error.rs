//! Error types returned by schema construction and sampling-plan generation.

use std::fmt;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Why a graph element could not be typed during schema construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MalformedReason {
    /// The type attribute is absent.
    MissingAttribute,
    /// The type attribute is present but is not a string.
    NotAString,
    /// An edge endpoint, or a queried node, is not a node of the graph.
    UnknownNode,
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MalformedReason::MissingAttribute => f.write_str("missing type attribute"),
            MalformedReason::NotAString => f.write_str("type attribute is not a string"),
            MalformedReason::UnknownNode => f.write_str("node not present in graph"),
        }
    }
}

/// Errors raised by schema construction and sampling-plan generation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A node type label was not found in the schema.
    #[error("unknown node type: {0}")]
    UnknownNodeType(String),
    /// An edge type triple or index was not found in the schema.
    #[error("unknown edge type: {0}")]
    UnknownEdgeType(String),
    /// A node or edge of the source graph cannot be typed.
    #[error("malformed graph input: {element} ({reason}: '{attribute}')")]
    MalformedGraphInput {
        /// Debug rendering of the offending node or edge.
        element: String,
        /// Attribute name that was expected to hold the type label.
        attribute: String,
        /// What was wrong with the attribute.
        reason: MalformedReason,
    },
    /// Negative hop count passed to a generator.
    #[error("invalid sampling depth: {0} (must be non-negative)")]
    InvalidDepth(i64),
    /// Caller misuse of a collaborator API.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl SchemaError {
    pub(crate) fn malformed(
        element: impl fmt::Debug,
        attribute: &str,
        reason: MalformedReason,
    ) -> Self {
        SchemaError::MalformedGraphInput {
            element: format!("{element:?}"),
            attribute: attribute.to_owned(),
            reason,
        }
    }
}
