mod error;
mod unknown;

use std::any::Any;
use std::fmt;

use crate::value::Value;

pub use error::PropertyError;
pub use unknown::UnknownObject;

/// Upcast helper so graph objects can be downcast to their concrete type.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A persistable, polymorphic object.
///
/// Implementations write their properties in a fixed order in [`save`] and
/// accept them back, one at a time and in any order, through
/// [`set_property`]. Object-valued properties hold [`ObjectId`] handles, so a
/// property may arrive after the object it points to was created but before
/// that object is complete.
///
/// [`save`]: Saveable::save
/// [`set_property`]: Saveable::set_property
/// [`ObjectId`]: crate::ObjectId
pub trait Saveable: AsAny + fmt::Debug + Send {
    /// Stable class discriminator; the key used by the `ClassRegistry`.
    fn class_name(&self) -> &str;

    /// Write every persisted property, in order.
    fn save(&self, out: &mut Properties);

    /// Accept one property read back from a stream.
    fn set_property(&mut self, name: &str, value: Value) -> Result<(), PropertyError>;

    /// Called once the whole graph this object belongs to is linked.
    fn finish_loading(&mut self) {}
}

/// Ordered property writes collected from [`Saveable::save`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Properties {
    entries: Vec<(String, Value)>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a property. Writing a name again replaces its value in place,
    /// so every name appears once.
    pub fn put(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl IntoIterator for Properties {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
