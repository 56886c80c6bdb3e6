use std::fmt;

use crate::graph::ObjectId;

/// Errors that end a serialization session.
///
/// Per-object problems (unknown classes, rejected properties, dangling
/// pointers) never surface here; they are logged and counted in
/// [`ReadStats`](super::ReadStats) instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveError {
    /// The token stream is structurally invalid. The reading session is
    /// discarded and cannot be resumed.
    MalformedStream(String),
    /// An object wrote a property whose name collides with a frame key.
    ReservedProperty { class: String, property: String },
    /// A handle that does not belong to the graph being written.
    MissingObject(ObjectId),
    /// The reader already failed; every later call reports this.
    SessionAborted,
    Io(String),
}

impl SaveError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        SaveError::MalformedStream(message.into())
    }
}

impl fmt::Display for SaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveError::MalformedStream(message) => write!(f, "malformed stream: {}", message),
            SaveError::ReservedProperty { class, property } => write!(
                f,
                "class {} writes reserved property name {}",
                class, property
            ),
            SaveError::MissingObject(id) => write!(f, "object {} is not in the graph", id),
            SaveError::SessionAborted => {
                write!(f, "reading session aborted after an earlier error")
            }
            SaveError::Io(message) => write!(f, "i/o error: {}", message),
        }
    }
}

impl std::error::Error for SaveError {}

impl From<serde_json::Error> for SaveError {
    fn from(err: serde_json::Error) -> Self {
        SaveError::MalformedStream(err.to_string())
    }
}

impl From<std::io::Error> for SaveError {
    fn from(err: std::io::Error) -> Self {
        SaveError::Io(err.to_string())
    }
}
