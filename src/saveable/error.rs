use std::fmt;

use crate::value::ValueKind;

/// A single property an object refused to accept.
///
/// Readers absorb these per object: the property is skipped, the rest of the
/// object and the rest of the graph still load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyError {
    /// The class has no property with this name.
    Unknown { class: String, property: String },
    /// The property exists but the value has the wrong kind.
    TypeMismatch {
        property: String,
        expected: ValueKind,
        found: ValueKind,
    },
}

impl PropertyError {
    pub fn unknown(class: impl Into<String>, property: impl Into<String>) -> Self {
        PropertyError::Unknown {
            class: class.into(),
            property: property.into(),
        }
    }
}

impl fmt::Display for PropertyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyError::Unknown { class, property } => {
                write!(f, "class {} has no property {}", class, property)
            }
            PropertyError::TypeMismatch {
                property,
                expected,
                found,
            } => write!(
                f,
                "property {} expects {} but got {}",
                property, expected, found
            ),
        }
    }
}

impl std::error::Error for PropertyError {}
