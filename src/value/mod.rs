//! Typed property values.
//!
//! Every property a Saveable writes or accepts is a [`Value`]. Nested objects
//! are carried as [`ObjectId`] handles into the owning graph, never inline.

#[cfg(feature = "glam")]
mod math;

use std::fmt;

use crate::graph::ObjectId;
use crate::saveable::PropertyError;

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    Vector(Vec<f64>),
    /// Rectangular: every inner vector has the same length. Whether those
    /// are rows or columns is up to the type that writes it.
    Matrix(Vec<Vec<f64>>),
    Object(ObjectId),
    List(Vec<Value>),
}

/// Discriminant of a [`Value`], used in type-mismatch diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueKind {
    Null,
    Bool,
    Int,
    Float,
    Str,
    Bytes,
    Vector,
    Matrix,
    Object,
    List,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::Str => "string",
            ValueKind::Bytes => "bytes",
            ValueKind::Vector => "vector",
            ValueKind::Matrix => "matrix",
            ValueKind::Object => "object",
            ValueKind::List => "list",
        };
        f.write_str(name)
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::Str(_) => ValueKind::Str,
            Value::Bytes(_) => ValueKind::Bytes,
            Value::Vector(_) => ValueKind::Vector,
            Value::Matrix(_) => ValueKind::Matrix,
            Value::Object(_) => ValueKind::Object,
            Value::List(_) => ValueKind::List,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Floats, with ints widened.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<ObjectId> {
        match self {
            Value::Object(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Build a matrix value from rows.
    pub fn matrix<R: Into<Vec<f64>>>(rows: impl IntoIterator<Item = R>) -> Self {
        Value::Matrix(rows.into_iter().map(Into::into).collect())
    }

    /// Every object handle inside this value, in order, including nested lists.
    pub fn objects(&self) -> Vec<ObjectId> {
        let mut out = Vec::new();
        self.collect_objects(&mut out);
        out
    }

    fn collect_objects(&self, out: &mut Vec<ObjectId>) {
        match self {
            Value::Object(id) => out.push(*id),
            Value::List(items) => {
                for item in items {
                    item.collect_objects(out);
                }
            }
            _ => {}
        }
    }

    /// Extract a typed value for `property`, or report a type mismatch.
    pub fn decode<T: FromValue>(self, property: &str) -> Result<T, PropertyError> {
        let found = self.kind();
        T::from_value(self).ok_or_else(|| PropertyError::TypeMismatch {
            property: property.to_string(),
            expected: T::KIND,
            found,
        })
    }
}

/// Types that can be pulled back out of a [`Value`].
pub trait FromValue: Sized {
    /// The kind reported when extraction fails.
    const KIND: ValueKind;

    fn from_value(value: Value) -> Option<Self>;
}

impl FromValue for Value {
    const KIND: ValueKind = ValueKind::Null;

    fn from_value(value: Value) -> Option<Self> {
        Some(value)
    }
}

impl FromValue for bool {
    const KIND: ValueKind = ValueKind::Bool;

    fn from_value(value: Value) -> Option<Self> {
        value.as_bool()
    }
}

impl FromValue for i64 {
    const KIND: ValueKind = ValueKind::Int;

    fn from_value(value: Value) -> Option<Self> {
        value.as_int()
    }
}

impl FromValue for i32 {
    const KIND: ValueKind = ValueKind::Int;

    fn from_value(value: Value) -> Option<Self> {
        value.as_int().and_then(|i| i32::try_from(i).ok())
    }
}

impl FromValue for u32 {
    const KIND: ValueKind = ValueKind::Int;

    fn from_value(value: Value) -> Option<Self> {
        value.as_int().and_then(|i| u32::try_from(i).ok())
    }
}

impl FromValue for usize {
    const KIND: ValueKind = ValueKind::Int;

    fn from_value(value: Value) -> Option<Self> {
        value.as_int().and_then(|i| usize::try_from(i).ok())
    }
}

impl FromValue for f64 {
    const KIND: ValueKind = ValueKind::Float;

    fn from_value(value: Value) -> Option<Self> {
        value.as_float()
    }
}

impl FromValue for f32 {
    const KIND: ValueKind = ValueKind::Float;

    fn from_value(value: Value) -> Option<Self> {
        value.as_float().map(|f| f as f32)
    }
}

impl FromValue for String {
    const KIND: ValueKind = ValueKind::Str;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl FromValue for Vec<u8> {
    const KIND: ValueKind = ValueKind::Bytes;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }
}

impl FromValue for Vec<f64> {
    const KIND: ValueKind = ValueKind::Vector;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Vector(v) => Some(v),
            _ => None,
        }
    }
}

impl FromValue for Vec<Vec<f64>> {
    const KIND: ValueKind = ValueKind::Matrix;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Matrix(rows) => Some(rows),
            _ => None,
        }
    }
}

impl FromValue for ObjectId {
    const KIND: ValueKind = ValueKind::Object;

    fn from_value(value: Value) -> Option<Self> {
        value.as_object()
    }
}

/// `null` or an object.
impl FromValue for Option<ObjectId> {
    const KIND: ValueKind = ValueKind::Object;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            Value::Object(id) => Some(Some(id)),
            _ => None,
        }
    }
}

/// A list whose every element is an object.
impl FromValue for Vec<ObjectId> {
    const KIND: ValueKind = ValueKind::List;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::List(items) => items.iter().map(Value::as_object).collect(),
            _ => None,
        }
    }
}

impl FromValue for Vec<Value> {
    const KIND: ValueKind = ValueKind::List;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::List(items) => Some(items),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i.into())
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i.into())
    }
}

impl From<usize> for Value {
    fn from(i: usize) -> Self {
        Value::Int(i64::try_from(i).unwrap_or(i64::MAX))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Float(f.into())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Value::Bytes(bytes)
    }
}

impl From<Vec<f64>> for Value {
    fn from(v: Vec<f64>) -> Self {
        Value::Vector(v)
    }
}

impl From<Vec<Vec<f64>>> for Value {
    fn from(rows: Vec<Vec<f64>>) -> Self {
        Value::Matrix(rows)
    }
}

impl From<ObjectId> for Value {
    fn from(id: ObjectId) -> Self {
        Value::Object(id)
    }
}

impl From<Option<ObjectId>> for Value {
    fn from(id: Option<ObjectId>) -> Self {
        id.map_or(Value::Null, Value::Object)
    }
}

impl From<Vec<ObjectId>> for Value {
    fn from(ids: Vec<ObjectId>) -> Self {
        Value::List(ids.into_iter().map(Value::Object).collect())
    }
}

impl From<&[ObjectId]> for Value {
    fn from(ids: &[ObjectId]) -> Self {
        Value::List(ids.iter().copied().map(Value::Object).collect())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}
