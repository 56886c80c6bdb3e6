//! Graph - the arena that owns every live Saveable object.
//!
//! Objects refer to each other through [`ObjectId`] handles instead of
//! pointers, so an edge can be recorded before its target is fully built and
//! cycles need no reference counting.

use std::any::Any;
use std::fmt;

use crate::saveable::Saveable;

/// Handle of an object inside a [`Graph`].
///
/// Handles are indices in creation order and stay valid for the lifetime of
/// the graph (or until [`Graph::truncate`] drops the object).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(u32);

impl ObjectId {
    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub(crate) fn from_index(index: usize) -> Self {
        ObjectId(index as u32)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Arena of Saveable objects.
#[derive(Default)]
pub struct Graph {
    objects: Vec<Box<dyn Saveable>>,
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("objects", &self.objects)
            .finish()
    }
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move an object into the graph and return its handle.
    pub fn insert<S: Saveable>(&mut self, object: S) -> ObjectId {
        self.insert_boxed(Box::new(object))
    }

    pub fn insert_boxed(&mut self, object: Box<dyn Saveable>) -> ObjectId {
        let id = ObjectId::from_index(self.objects.len());
        self.objects.push(object);
        id
    }

    pub fn get(&self, id: ObjectId) -> Option<&dyn Saveable> {
        self.objects.get(id.index()).map(|object| object.as_ref())
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut (dyn Saveable + 'static)> {
        self.objects.get_mut(id.index()).map(|object| object.as_mut())
    }

    /// Borrow an object as its concrete type.
    pub fn get_as<T: Saveable>(&self, id: ObjectId) -> Option<&T> {
        let object: &dyn Any = self.get(id)?.as_any();
        object.downcast_ref::<T>()
    }

    pub fn get_as_mut<T: Saveable>(&mut self, id: ObjectId) -> Option<&mut T> {
        let object: &mut dyn Any = self.get_mut(id)?.as_any_mut();
        object.downcast_mut::<T>()
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        id.index() < self.objects.len()
    }

    pub fn class_name(&self, id: ObjectId) -> Option<&str> {
        self.get(id).map(|object| object.class_name())
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Handles of every object, in creation order.
    pub fn ids(&self) -> impl Iterator<Item = ObjectId> + '_ {
        (0..self.objects.len()).map(ObjectId::from_index)
    }

    /// Drop every object created at or after `len`.
    pub fn truncate(&mut self, len: usize) {
        self.objects.truncate(len);
    }
}
