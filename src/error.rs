//! Error types for style resolution.

use thiserror::Error;

use crate::dom::ArenaNodeId;

/// Errors that can occur while building a tree or resolving styles.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("invalid media query `{query}`: {reason}")]
    InvalidMediaQuery { query: String, reason: String },

    #[error("node {0:?} is not an element")]
    NotAnElement(ArenaNodeId),

    #[error("element {0:?} already hosts a shadow root")]
    ShadowRootAlreadyAttached(ArenaNodeId),
}

pub type Result<T> = std::result::Result<T, Error>;
