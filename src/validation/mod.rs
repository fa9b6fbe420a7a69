//! Collecting validation errors: schema invariants and request variables.

mod input_value;

use std::fmt;

use crate::parser::SourcePosition;

pub(crate) use self::input_value::coerce_variable_values;

/// A collected validation error.
///
/// Unlike builder errors, these do not halt processing: the full list is
/// gathered and returned. Each error pinpoints one or more source
/// positions.
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct RuleError {
    locations: Vec<SourcePosition>,
    message: String,
}

impl RuleError {
    #[doc(hidden)]
    pub fn new(message: &str, locations: &[SourcePosition]) -> Self {
        Self {
            message: message.into(),
            locations: locations.to_vec(),
        }
    }

    /// Accesses the message of this validation error.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Accesses the positions of this validation error.
    ///
    /// Validation errors can carry no position at all when the AST node at
    /// fault was constructed without location information.
    pub fn locations(&self) -> &[SourcePosition] {
        &self.locations
    }
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let locations = self
            .locations
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{}. At {locations}", self.message)
    }
}

impl std::error::Error for RuleError {}
