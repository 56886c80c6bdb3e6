//! ClassRegistry - string-keyed lookup from class name to constructor.
//!
//! The registry is an ordinary value: build it, register every class the
//! stream may contain, and hand it to each reading session. Clones share
//! the same table, so late registrations are seen by every holder.
//!
//! ## Example
//!
//! ```ignore
//! use saveable_graph::{ClassEntry, ClassRegistry};
//!
//! let registry = ClassRegistry::new();
//! registry.register_type::<Point>("Point");
//! registry.register("Mesh", ClassEntry::prototype(Mesh::unit_cube));
//!
//! let object = registry.generate("Point");
//! ```

mod entry;

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::saveable::{Saveable, UnknownObject};

pub use entry::{ClassEntry, Construction};

#[derive(Clone, Default)]
pub struct ClassRegistry {
    entries: Arc<RwLock<HashMap<String, Arc<ClassEntry>>>>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the entry for `name`.
    pub fn register(&self, name: impl Into<String>, entry: ClassEntry) {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        entries.insert(name.into(), Arc::new(entry));
    }

    /// Register `T` to be built with `T::default()`.
    pub fn register_type<T: Saveable + Default>(&self, name: impl Into<String>) {
        self.register(name, ClassEntry::new(T::default));
    }

    /// Register `T` to be cloned from a sample built once by `init`.
    pub fn register_prototype<T, F>(&self, name: impl Into<String>, init: F)
    where
        T: Saveable + Clone + Sync,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.register(name, ClassEntry::prototype(init));
    }

    pub fn resolve(&self, name: &str) -> Option<Arc<ClassEntry>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    /// Instantiate `name`. Unknown names yield an [`UnknownObject`] that keeps
    /// the class name, so the data survives a later write.
    pub fn generate(&self, name: &str) -> Box<dyn Saveable> {
        match self.resolve(name) {
            Some(entry) => entry.generate(name),
            None => {
                tracing::warn!(class = name, "unknown class, substituting placeholder");
                Box::new(UnknownObject::new(name))
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = entries.keys().cloned().collect();
        names.sort();
        names
    }
}
