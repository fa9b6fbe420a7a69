//! Source positions for AST nodes.
//!
//! The lexer and parser themselves live outside this crate (see
//! [`crate::schema::translate`] for the `graphql-parser` boundary); this
//! module only carries the position types every AST node is wrapped in.

mod utils;

use std::fmt;

pub use self::utils::{SourcePosition, Span, Spanning};

/// An error produced while turning source text into a document.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParseError {
    message: String,
}

impl ParseError {
    #[doc(hidden)]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The human-readable parser message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.message.fmt(f)
    }
}

impl std::error::Error for ParseError {}
