use std::collections::{HashMap, VecDeque};

use serde_json::{Map, Value as Json};

use crate::graph::{Graph, ObjectId};
use crate::saveable::Properties;
use crate::value::Value;

use super::codec::{self, CLASS_KEY, PTR_KEY};
use super::error::SaveError;
use super::TokenStream;

/// Nested frames a root may carry inline before children are detached.
pub const DEFAULT_INLINE_DEPTH: usize = 48;

/// Serializes object graphs into a [`TokenStream`].
///
/// Objects reachable along more than one path (shared, or on a cycle) get a
/// pointer id the first time they are written; later occurrences become
/// `{"ref": id}` tokens. Everything else is written inline without an id.
///
/// Inline nesting is capped. An object that would sit deeper than the cap is
/// given a pointer id, replaced by a reference, and written after its root as
/// a `{"detached": frame}` entry, so long chains stay shallow on the wire.
pub struct Writer<'g> {
    graph: &'g Graph,
    roots: Vec<ObjectId>,
    pretty: bool,
    inline_depth: usize,
}

impl<'g> Writer<'g> {
    pub fn new(graph: &'g Graph) -> Self {
        Writer {
            graph,
            roots: Vec::new(),
            pretty: false,
            inline_depth: DEFAULT_INLINE_DEPTH,
        }
    }

    /// Indent the output. Off by default.
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// How many levels of objects and lists may nest inside one entry. `0`
    /// writes every nested object as its own detached entry.
    pub fn inline_depth(mut self, depth: usize) -> Self {
        self.inline_depth = depth;
        self
    }

    /// Queue a root for the next [`flush`](Self::flush).
    pub fn add(&mut self, root: ObjectId) -> &mut Self {
        self.roots.push(root);
        self
    }

    pub fn pending(&self) -> &[ObjectId] {
        &self.roots
    }

    /// Write every queued root as one session and clear the queue.
    pub fn flush(&mut self) -> Result<TokenStream, SaveError> {
        let roots = std::mem::take(&mut self.roots);
        let mut session = Session::new(self.graph, self.inline_depth);
        session.count(&roots)?;

        let mut frames = Vec::with_capacity(roots.len());
        for root in roots {
            frames.push(session.write_object(root, 0)?);
            while let Some((id, ptr)) = session.detached.pop_front() {
                let frame = session.write_frame(id, Some(ptr), 0)?;
                frames.push(codec::detached_token(frame));
            }
        }
        tracing::debug!(
            entries = frames.len(),
            objects = session.appearances.len(),
            pointers = session.next_ptr,
            "wrote token stream"
        );

        let json = Json::Array(frames);
        let text = if self.pretty {
            serde_json::to_string_pretty(&json)?
        } else {
            serde_json::to_string(&json)?
        };
        Ok(TokenStream::new(text))
    }
}

/// State of one write pass: appearance counts, cached property lists, the
/// pointer ids handed out so far and objects waiting to be written detached.
struct Session<'g> {
    graph: &'g Graph,
    inline_depth: usize,
    appearances: HashMap<ObjectId, usize>,
    saved: HashMap<ObjectId, Properties>,
    pointers: HashMap<ObjectId, u32>,
    next_ptr: u32,
    detached: VecDeque<(ObjectId, u32)>,
}

impl<'g> Session<'g> {
    fn new(graph: &'g Graph, inline_depth: usize) -> Self {
        Session {
            graph,
            inline_depth,
            appearances: HashMap::new(),
            saved: HashMap::new(),
            pointers: HashMap::new(),
            next_ptr: 0,
            detached: VecDeque::new(),
        }
    }

    /// Count how often each reachable object appears (as a root or as the
    /// target of an edge). Each object's properties are captured once here
    /// and reused when writing.
    fn count(&mut self, roots: &[ObjectId]) -> Result<(), SaveError> {
        let mut stack = Vec::new();
        for &root in roots {
            self.visit(root, &mut stack)?;
        }

        while let Some(id) = stack.pop() {
            let object = self.graph.get(id).ok_or(SaveError::MissingObject(id))?;
            let mut props = Properties::new();
            object.save(&mut props);

            for (_, value) in props.iter() {
                for child in value.objects() {
                    self.visit(child, &mut stack)?;
                }
            }
            self.saved.insert(id, props);
        }
        Ok(())
    }

    fn visit(&mut self, id: ObjectId, stack: &mut Vec<ObjectId>) -> Result<(), SaveError> {
        if !self.graph.contains(id) {
            return Err(SaveError::MissingObject(id));
        }
        let count = self.appearances.entry(id).or_insert(0);
        *count += 1;
        if *count == 1 {
            stack.push(id);
        }
        Ok(())
    }

    fn assign_pointer(&mut self, id: ObjectId) -> u32 {
        self.next_ptr += 1;
        self.pointers.insert(id, self.next_ptr);
        self.next_ptr
    }

    fn write_object(&mut self, id: ObjectId, depth: usize) -> Result<Json, SaveError> {
        if let Some(ptr) = self.pointers.get(&id) {
            return Ok(codec::ref_token(*ptr));
        }
        if depth > self.inline_depth {
            let ptr = self.assign_pointer(id);
            self.detached.push_back((id, ptr));
            return Ok(codec::ref_token(ptr));
        }
        let ptr = if self.appearances.get(&id).copied().unwrap_or(0) > 1 {
            Some(self.assign_pointer(id))
        } else {
            None
        };
        self.write_frame(id, ptr, depth)
    }

    fn write_frame(&mut self, id: ObjectId, ptr: Option<u32>, depth: usize) -> Result<Json, SaveError> {
        let object = self.graph.get(id).ok_or(SaveError::MissingObject(id))?;
        let class = object.class_name().to_string();

        let mut frame = Map::new();
        frame.insert(CLASS_KEY.to_string(), Json::from(class.as_str()));
        if let Some(ptr) = ptr {
            frame.insert(PTR_KEY.to_string(), Json::from(ptr));
        }

        let props = self.saved.remove(&id).unwrap_or_default();
        for (name, value) in props {
            if codec::is_reserved(&name) {
                return Err(SaveError::ReservedProperty {
                    class,
                    property: name,
                });
            }
            let token = self.write_value(value, depth + 1)?;
            frame.insert(name, token);
        }
        Ok(Json::Object(frame))
    }

    fn write_value(&mut self, value: Value, depth: usize) -> Result<Json, SaveError> {
        Ok(match value {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(b),
            Value::Int(i) => Json::from(i),
            Value::Float(f) => codec::encode_float(f),
            Value::Str(s) => Json::String(s),
            Value::Bytes(bytes) => codec::encode_bytes(&bytes),
            Value::Vector(v) => codec::encode_vector(&v),
            Value::Matrix(rows) => codec::encode_matrix(&rows),
            Value::Object(id) => self.write_object(id, depth)?,
            Value::List(items) => Json::Array(
                items
                    .into_iter()
                    .map(|item| self.write_value(item, depth + 1))
                    .collect::<Result<_, _>>()?,
            ),
        })
    }
}

/// Serialize `roots` (and everything reachable from them) in one session.
pub fn serialize(graph: &Graph, roots: &[ObjectId]) -> Result<TokenStream, SaveError> {
    let mut writer = Writer::new(graph);
    for &root in roots {
        writer.add(root);
    }
    writer.flush()
}
