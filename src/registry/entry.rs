use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::saveable::{Saveable, UnknownObject};

type Factory = Arc<dyn Fn() -> Box<dyn Saveable> + Send + Sync>;

/// How an entry produces instances.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Construction {
    /// Call the factory for every instance.
    Fresh,
    /// Build one sample on first use, then clone it for every instance.
    Prototype,
    /// Registered, but nothing can build it; instances are placeholders.
    Unconstructible,
}

/// One class registered under a name.
#[derive(Clone)]
pub struct ClassEntry {
    construction: Construction,
    factory: Option<Factory>,
}

impl fmt::Debug for ClassEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassEntry")
            .field("construction", &self.construction)
            .finish()
    }
}

impl ClassEntry {
    pub fn new<T, F>(factory: F) -> Self
    where
        T: Saveable,
        F: Fn() -> T + Send + Sync + 'static,
    {
        ClassEntry {
            construction: Construction::Fresh,
            factory: Some(Arc::new(move || Box::new(factory()) as Box<dyn Saveable>)),
        }
    }

    /// For types whose correct defaults are expensive or awkward to rebuild:
    /// `init` runs once, lazily, and every instance is a clone of its result.
    pub fn prototype<T, F>(init: F) -> Self
    where
        T: Saveable + Clone + Sync,
        F: Fn() -> T + Send + Sync + 'static,
    {
        let sample: OnceLock<T> = OnceLock::new();
        ClassEntry {
            construction: Construction::Prototype,
            factory: Some(Arc::new(move || {
                Box::new(sample.get_or_init(&init).clone()) as Box<dyn Saveable>
            })),
        }
    }

    /// A name that is known but has no usable constructor (for example an
    /// abstract base kept for documentation or a type whose crate is absent).
    pub fn unconstructible() -> Self {
        ClassEntry {
            construction: Construction::Unconstructible,
            factory: None,
        }
    }

    pub fn construction(&self) -> Construction {
        self.construction
    }

    /// Produce an instance. Never fails: without a factory the result is an
    /// [`UnknownObject`] carrying `class_name`.
    pub fn generate(&self, class_name: &str) -> Box<dyn Saveable> {
        match &self.factory {
            Some(factory) => factory(),
            None => {
                tracing::warn!(
                    class = class_name,
                    "no usable constructor, substituting placeholder"
                );
                Box::new(UnknownObject::new(class_name))
            }
        }
    }
}
