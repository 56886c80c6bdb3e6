mod codec;
mod error;
mod file;
mod reader;
mod writer;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use error::SaveError;
pub use file::{load_file, save_file};
pub use reader::{deserialize, PointerState, ReadStats, Reader};
pub use writer::{serialize, Writer};

/// The textual (JSON) form of a serialized object graph.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenStream(String);

impl TokenStream {
    pub fn new(text: impl Into<String>) -> Self {
        TokenStream(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for TokenStream {
    fn from(text: String) -> Self {
        TokenStream(text)
    }
}

impl From<&str> for TokenStream {
    fn from(text: &str) -> Self {
        TokenStream(text.to_string())
    }
}

impl fmt::Display for TokenStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
