use crate::value::Value;

use super::{Properties, PropertyError, Saveable};

/// Placeholder for a class the registry could not construct.
///
/// It keeps the original class name and every property it receives, in
/// order, so writing it back out reproduces the frame it was read from.
#[derive(Clone, Debug, PartialEq)]
pub struct UnknownObject {
    class_name: String,
    properties: Properties,
}

impl UnknownObject {
    pub fn new(class_name: impl Into<String>) -> Self {
        UnknownObject {
            class_name: class_name.into(),
            properties: Properties::new(),
        }
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }
}

impl Saveable for UnknownObject {
    fn class_name(&self) -> &str {
        &self.class_name
    }

    fn save(&self, out: &mut Properties) {
        for (name, value) in self.properties.iter() {
            out.put(name, value.clone());
        }
    }

    fn set_property(&mut self, name: &str, value: Value) -> Result<(), PropertyError> {
        self.properties.put(name, value);
        Ok(())
    }
}
