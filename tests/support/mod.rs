//! Saveable fixtures shared by the integration suites.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use saveable_graph::{ClassRegistry, ObjectId, Properties, PropertyError, Saveable, Value};
use tracing_subscriber::EnvFilter;

/// Route `tracing` output through the test harness. Set `RUST_LOG=debug` to
/// see it.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn registry() -> ClassRegistry {
    let registry = ClassRegistry::new();
    registry.register_type::<Point>("Point");
    registry.register_type::<Scene>("Scene");
    registry.register_type::<Node>("Node");
    registry.register_type::<Blob>("Blob");
    registry
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

impl Saveable for Point {
    fn class_name(&self) -> &str {
        "Point"
    }

    fn save(&self, out: &mut Properties) {
        out.put("x", self.x).put("y", self.y);
    }

    fn set_property(&mut self, name: &str, value: Value) -> Result<(), PropertyError> {
        match name {
            "x" => self.x = value.decode(name)?,
            "y" => self.y = value.decode(name)?,
            _ => return Err(PropertyError::unknown("Point", name)),
        }
        Ok(())
    }
}

/// Integer-coordinate point saved under the same class name as [`Point`].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct GridPoint {
    pub x: i64,
    pub y: i64,
}

impl Saveable for GridPoint {
    fn class_name(&self) -> &str {
        "Point"
    }

    fn save(&self, out: &mut Properties) {
        out.put("x", self.x).put("y", self.y);
    }

    fn set_property(&mut self, name: &str, value: Value) -> Result<(), PropertyError> {
        match name {
            "x" => self.x = value.decode(name)?,
            "y" => self.y = value.decode(name)?,
            _ => return Err(PropertyError::unknown("Point", name)),
        }
        Ok(())
    }
}

/// Two point slots that may or may not share a target.
#[derive(Debug, Default, Clone)]
pub struct Scene {
    pub a: Option<ObjectId>,
    pub b: Option<ObjectId>,
}

impl Saveable for Scene {
    fn class_name(&self) -> &str {
        "Scene"
    }

    fn save(&self, out: &mut Properties) {
        out.put("a", self.a).put("b", self.b);
    }

    fn set_property(&mut self, name: &str, value: Value) -> Result<(), PropertyError> {
        match name {
            "a" => self.a = value.decode(name)?,
            "b" => self.b = value.decode(name)?,
            _ => return Err(PropertyError::unknown("Scene", name)),
        }
        Ok(())
    }
}

static FINISH_SEQUENCE: AtomicUsize = AtomicUsize::new(0);

/// Tree node with a back edge to its parent.
///
/// `finish_loading` stamps a global sequence number and records how many
/// children were linked at that point.
#[derive(Debug, Default, Clone)]
pub struct Node {
    pub name: String,
    pub parent: Option<ObjectId>,
    pub children: Vec<ObjectId>,
    pub finished_at: Option<usize>,
    pub children_at_finish: Option<usize>,
}

impl Node {
    pub fn named(name: &str) -> Self {
        Node {
            name: name.into(),
            ..Node::default()
        }
    }
}

impl Saveable for Node {
    fn class_name(&self) -> &str {
        "Node"
    }

    fn save(&self, out: &mut Properties) {
        out.put("name", self.name.as_str())
            .put("parent", self.parent)
            .put("children", self.children.as_slice());
    }

    fn set_property(&mut self, name: &str, value: Value) -> Result<(), PropertyError> {
        match name {
            "name" => self.name = value.decode(name)?,
            "parent" => self.parent = value.decode(name)?,
            "children" => self.children = value.decode(name)?,
            _ => return Err(PropertyError::unknown("Node", name)),
        }
        Ok(())
    }

    fn finish_loading(&mut self) {
        self.finished_at = Some(FINISH_SEQUENCE.fetch_add(1, Ordering::SeqCst));
        self.children_at_finish = Some(self.children.len());
    }
}

/// One property of every scalar kind.
#[derive(Debug, Default, Clone)]
pub struct Blob {
    pub flag: bool,
    pub count: i64,
    pub ratio: f64,
    pub odd: f64,
    pub label: String,
    pub raw: Vec<u8>,
    pub position: Vec<f64>,
    pub transform: Vec<Vec<f64>>,
    pub tags: Vec<Value>,
}

impl Saveable for Blob {
    fn class_name(&self) -> &str {
        "Blob"
    }

    fn save(&self, out: &mut Properties) {
        out.put("flag", self.flag)
            .put("count", self.count)
            .put("ratio", self.ratio)
            .put("odd", self.odd)
            .put("label", self.label.as_str())
            .put("raw", self.raw.clone())
            .put("position", self.position.clone())
            .put("transform", self.transform.clone())
            .put("tags", self.tags.clone());
    }

    fn set_property(&mut self, name: &str, value: Value) -> Result<(), PropertyError> {
        match name {
            "flag" => self.flag = value.decode(name)?,
            "count" => self.count = value.decode(name)?,
            "ratio" => self.ratio = value.decode(name)?,
            "odd" => self.odd = value.decode(name)?,
            "label" => self.label = value.decode(name)?,
            "raw" => self.raw = value.decode(name)?,
            "position" => self.position = value.decode(name)?,
            "transform" => self.transform = value.decode(name)?,
            "tags" => self.tags = value.decode(name)?,
            _ => return Err(PropertyError::unknown("Blob", name)),
        }
        Ok(())
    }
}
