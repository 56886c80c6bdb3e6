use std::collections::HashMap;
use std::vec::IntoIter;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};

use crate::graph::{Graph, ObjectId};
use crate::registry::ClassRegistry;
use crate::saveable::UnknownObject;
use crate::value::Value;

use super::codec::{
    self, BYTES_KEY, CLASS_KEY, DETACHED_KEY, FLOAT_KEY, MATRIX_KEY, PTR_KEY, REF_KEY, VECTOR_KEY,
};
use super::error::SaveError;
use super::TokenStream;

const DEFAULT_MAX_DEPTH: usize = 128;

/// Diagnostics gathered over one reading session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadStats {
    pub objects_created: usize,
    /// Objects that came back as [`UnknownObject`] placeholders.
    pub placeholders: usize,
    /// Properties left unset because their pointer id never registered.
    pub dangling_references: usize,
    /// Properties an object refused in `set_property`.
    pub rejected_properties: usize,
}

/// Lifecycle of one pointer id inside a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerState {
    Unseen,
    /// Referenced, not yet registered; consumers are queued.
    Missing,
    Registered(ObjectId),
}

/// A property value that may still contain unregistered pointer ids.
#[derive(Debug)]
enum Template {
    Ready(Value),
    Ref(u32),
    List(Vec<Template>),
}

impl Template {
    fn pending_pointers(&self, out: &mut Vec<u32>) {
        match self {
            Template::Ready(_) => {}
            Template::Ref(ptr) => {
                if !out.contains(ptr) {
                    out.push(*ptr);
                }
            }
            Template::List(items) => {
                for item in items {
                    item.pending_pointers(out);
                }
            }
        }
    }

    fn resolve(self, pointers: &HashMap<u32, ObjectId>) -> Option<Value> {
        match self {
            Template::Ready(value) => Some(value),
            Template::Ref(ptr) => pointers.get(&ptr).copied().map(Value::Object),
            Template::List(items) => items
                .into_iter()
                .map(|item| item.resolve(pointers))
                .collect::<Option<Vec<_>>>()
                .map(Value::List),
        }
    }
}

/// Where a deferred value lands once its pointers register.
#[derive(Debug)]
enum Target {
    Property { owner: ObjectId, name: String },
    Root(usize),
}

/// A missing reference record: one deferred assignment, fired when the last
/// of its pointer ids registers.
#[derive(Debug)]
struct Waiter {
    target: Target,
    template: Template,
    outstanding: usize,
}

/// Rebuilds objects from a [`TokenStream`] into a [`Graph`].
///
/// Objects are created through the [`ClassRegistry`] and registered under
/// their pointer id before their own properties are read, so references to
/// an object that is still being built resolve at once. References to ids
/// not seen yet are queued and patched in the moment the id registers.
pub struct Reader<'a> {
    registry: &'a ClassRegistry,
    graph: &'a mut Graph,
    entries: IntoIter<Json>,
    session_start: usize,
    pointers: HashMap<u32, ObjectId>,
    missing: HashMap<u32, Vec<usize>>,
    waiters: Vec<Option<Waiter>>,
    roots: Vec<Option<ObjectId>>,
    stats: ReadStats,
    max_depth: usize,
    warn_on_missing: bool,
    aborted: bool,
}

impl<'a> Reader<'a> {
    /// Parse `stream` and prepare to read it into `graph`.
    ///
    /// JSON nested deeper than serde_json's recursion limit is rejected as
    /// malformed; the writer detaches deep objects so its output never is.
    pub fn new(
        registry: &'a ClassRegistry,
        graph: &'a mut Graph,
        stream: &TokenStream,
    ) -> Result<Self, SaveError> {
        let json: Json = serde_json::from_str(stream.as_str())?;

        let Json::Array(entries) = json else {
            return Err(SaveError::malformed("top level must be an array of frames"));
        };
        let session_start = graph.len();
        Ok(Reader {
            registry,
            graph,
            entries: entries.into_iter(),
            session_start,
            pointers: HashMap::new(),
            missing: HashMap::new(),
            waiters: Vec::new(),
            roots: Vec::new(),
            stats: ReadStats::default(),
            max_depth: DEFAULT_MAX_DEPTH,
            warn_on_missing: true,
            aborted: false,
        })
    }

    /// Deepest allowed nesting of inline frames and lists inside one entry.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Log unresolved lookups and dangling references as warnings (default)
    /// or only at debug level.
    pub fn warn_on_missing(mut self, warn: bool) -> Self {
        self.warn_on_missing = warn;
        self
    }

    /// Read the next top-level entry.
    ///
    /// Returns the new object for a frame, or the referenced object for a
    /// top-level reference that is already registered. A top-level reference
    /// to an id not registered yet is queued as a root and skipped, and so
    /// is a detached frame, which is read but is not a root. `None` once the
    /// stream is exhausted.
    pub fn read_object(&mut self) -> Result<Option<ObjectId>, SaveError> {
        if self.aborted {
            return Err(SaveError::SessionAborted);
        }
        match self.read_next() {
            Ok(id) => Ok(id),
            Err(err) => {
                self.abort(&err);
                Err(err)
            }
        }
    }

    fn read_next(&mut self) -> Result<Option<ObjectId>, SaveError> {
        while let Some(entry) = self.entries.next() {
            let mut map = match entry {
                Json::Object(map) => map,
                other => {
                    return Err(SaveError::malformed(format!(
                        "top-level entry must be a frame or reference, got {}",
                        other
                    )))
                }
            };
            if map.len() == 1 && map.contains_key(DETACHED_KEY) {
                match map.remove(DETACHED_KEY) {
                    Some(Json::Object(frame)) if frame.contains_key(CLASS_KEY) => {
                        self.read_frame(frame, 0)?;
                        continue;
                    }
                    _ => return Err(SaveError::malformed("detached entry must hold a frame")),
                }
            }

            let slot = self.roots.len();
            if map.contains_key(CLASS_KEY) {
                let id = self.read_frame(map, 0)?;
                self.roots.push(Some(id));
                return Ok(Some(id));
            }

            let ptr = Self::single_key(&map, REF_KEY)
                .ok_or_else(|| SaveError::malformed("top-level object is neither frame nor ref"))
                .and_then(codec::decode_ptr)?;
            if ptr == 0 {
                return Err(SaveError::malformed("top-level null reference"));
            }
            match self.pointers.get(&ptr).copied() {
                Some(id) => {
                    self.roots.push(Some(id));
                    return Ok(Some(id));
                }
                None => {
                    self.roots.push(None);
                    self.queue(Target::Root(slot), Template::Ref(ptr));
                }
            }
        }
        Ok(None)
    }

    fn single_key<'m>(map: &'m Map<String, Json>, key: &str) -> Option<&'m Json> {
        if map.len() == 1 {
            map.get(key)
        } else {
            None
        }
    }

    fn read_frame(&mut self, map: Map<String, Json>, depth: usize) -> Result<ObjectId, SaveError> {
        if depth > self.max_depth {
            return Err(SaveError::malformed(format!(
                "nesting deeper than {} levels",
                self.max_depth
            )));
        }
        let class = map
            .get(CLASS_KEY)
            .and_then(Json::as_str)
            .ok_or_else(|| SaveError::malformed("frame class must be a string"))?
            .to_string();
        let ptr = match map.get(PTR_KEY) {
            Some(json) => codec::decode_ptr(json)?,
            None => 0,
        };

        let object = self.registry.generate(&class);
        if (*object).as_any().is::<UnknownObject>() {
            self.stats.placeholders += 1;
        }
        let id = self.graph.insert_boxed(object);
        self.stats.objects_created += 1;
        if ptr != 0 {
            self.bind(id, ptr)?;
        }

        for (name, json) in map {
            if codec::is_reserved(&name) {
                continue;
            }
            match self.decode(json, depth + 1)? {
                Template::Ready(value) => self.assign(id, &name, value),
                template => self.queue(Target::Property { owner: id, name }, template),
            }
        }
        Ok(id)
    }

    fn decode(&mut self, json: Json, depth: usize) -> Result<Template, SaveError> {
        if depth > self.max_depth {
            return Err(SaveError::malformed(format!(
                "nesting deeper than {} levels",
                self.max_depth
            )));
        }
        let value = match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(number) => match number.as_i64() {
                Some(i) => Value::Int(i),
                None if number.is_u64() => {
                    return Err(SaveError::malformed(format!(
                        "integer {} out of range",
                        number
                    )))
                }
                None => Value::Float(codec::decode_float(&Json::Number(number))?),
            },
            Json::String(s) => Value::Str(s),
            Json::Array(items) => {
                let items = items
                    .into_iter()
                    .map(|item| self.decode(item, depth + 1))
                    .collect::<Result<Vec<_>, _>>()?;
                if items.iter().all(|item| matches!(item, Template::Ready(_))) {
                    Value::List(
                        items
                            .into_iter()
                            .filter_map(|item| match item {
                                Template::Ready(value) => Some(value),
                                _ => None,
                            })
                            .collect(),
                    )
                } else {
                    return Ok(Template::List(items));
                }
            }
            Json::Object(map) => {
                if map.contains_key(CLASS_KEY) {
                    Value::Object(self.read_frame(map, depth)?)
                } else if let Some(json) = Self::single_key(&map, REF_KEY) {
                    let ptr = codec::decode_ptr(json)?;
                    if ptr == 0 {
                        Value::Null
                    } else {
                        match self.pointers.get(&ptr) {
                            Some(id) => Value::Object(*id),
                            None => return Ok(Template::Ref(ptr)),
                        }
                    }
                } else if let Some(json) = Self::single_key(&map, BYTES_KEY) {
                    Value::Bytes(codec::decode_bytes(json)?)
                } else if let Some(json) = Self::single_key(&map, VECTOR_KEY) {
                    Value::Vector(codec::decode_vector(json)?)
                } else if let Some(json) = Self::single_key(&map, MATRIX_KEY) {
                    Value::Matrix(codec::decode_matrix(json)?)
                } else if map.len() == 1 && map.contains_key(FLOAT_KEY) {
                    Value::Float(codec::decode_float(&Json::Object(map))?)
                } else {
                    return Err(SaveError::malformed(format!(
                        "unrecognized value token {}",
                        Json::Object(map)
                    )));
                }
            }
        };
        Ok(Template::Ready(value))
    }

    fn assign(&mut self, owner: ObjectId, name: &str, value: Value) {
        let Some(object) = self.graph.get_mut(owner) else {
            return;
        };
        if let Err(err) = object.set_property(name, value) {
            tracing::warn!(
                class = object.class_name(),
                property = name,
                error = %err,
                "property rejected"
            );
            self.stats.rejected_properties += 1;
        }
    }

    fn fire(&mut self, target: Target, value: Value) {
        match target {
            Target::Property { owner, name } => self.assign(owner, &name, value),
            Target::Root(slot) => {
                if let Some(root) = self.roots.get_mut(slot) {
                    *root = value.as_object();
                }
            }
        }
    }

    fn queue(&mut self, target: Target, template: Template) {
        let mut pending = Vec::new();
        template.pending_pointers(&mut pending);
        pending.retain(|ptr| !self.pointers.contains_key(ptr));

        if pending.is_empty() {
            if let Some(value) = template.resolve(&self.pointers) {
                self.fire(target, value);
            }
            return;
        }

        let index = self.waiters.len();
        self.waiters.push(Some(Waiter {
            target,
            template,
            outstanding: pending.len(),
        }));
        for ptr in pending {
            self.missing.entry(ptr).or_default().push(index);
        }
    }

    /// Bind `ptr` to `object` and fire every assignment waiting on it.
    ///
    /// Call this as soon as the id is known, before the object's own
    /// properties are complete; cycles depend on it. Registering an id twice
    /// is a malformed stream.
    pub fn register(&mut self, object: ObjectId, ptr: u32) -> Result<(), SaveError> {
        if self.aborted {
            return Err(SaveError::SessionAborted);
        }
        let result = if self.graph.contains(object) {
            self.bind(object, ptr)
        } else {
            Err(SaveError::MissingObject(object))
        };
        if let Err(err) = &result {
            self.abort(err);
        }
        result
    }

    fn bind(&mut self, object: ObjectId, ptr: u32) -> Result<(), SaveError> {
        if ptr == 0 {
            return Err(SaveError::malformed("pointer id 0 is reserved for null"));
        }
        if self.pointers.contains_key(&ptr) {
            return Err(SaveError::malformed(format!(
                "pointer id {} registered twice",
                ptr
            )));
        }
        self.pointers.insert(ptr, object);

        let Some(waiting) = self.missing.remove(&ptr) else {
            return Ok(());
        };
        for index in waiting {
            let ready = match self.waiters.get_mut(index).and_then(Option::as_mut) {
                Some(waiter) => {
                    waiter.outstanding -= 1;
                    waiter.outstanding == 0
                }
                None => false,
            };
            if !ready {
                continue;
            }
            if let Some(waiter) = self.waiters[index].take() {
                if let Some(value) = waiter.template.resolve(&self.pointers) {
                    self.fire(waiter.target, value);
                }
            }
        }
        Ok(())
    }

    /// Queue `owner.name = <object with ptr>` until `ptr` registers. Fires
    /// immediately if it already has; pointer 0 assigns null.
    pub fn add_missing_reference(
        &mut self,
        owner: ObjectId,
        name: impl Into<String>,
        ptr: u32,
    ) -> Result<(), SaveError> {
        if self.aborted {
            return Err(SaveError::SessionAborted);
        }
        if !self.graph.contains(owner) {
            return Err(SaveError::MissingObject(owner));
        }
        let name = name.into();
        if ptr == 0 {
            self.assign(owner, &name, Value::Null);
        } else {
            self.queue(Target::Property { owner, name }, Template::Ref(ptr));
        }
        Ok(())
    }

    /// Look up a registered pointer id. A miss is not final: the object may
    /// register later in the stream. Use
    /// [`add_missing_reference`](Self::add_missing_reference) to be notified.
    pub fn get_by_pointer(&self, ptr: u32, warn_if_missing: bool) -> Option<ObjectId> {
        let found = self.pointers.get(&ptr).copied();
        if found.is_none() && warn_if_missing {
            if self.warn_on_missing {
                tracing::warn!(ptr, "pointer id not registered yet");
            } else {
                tracing::debug!(ptr, "pointer id not registered yet");
            }
        }
        found
    }

    pub fn pointer_state(&self, ptr: u32) -> PointerState {
        if let Some(id) = self.pointers.get(&ptr) {
            PointerState::Registered(*id)
        } else if self.missing.contains_key(&ptr) {
            PointerState::Missing
        } else {
            PointerState::Unseen
        }
    }

    /// Current graph length. Objects read after this call have handles at or
    /// beyond it; pass it to [`finish_from`](Self::finish_from) to run the
    /// lifecycle pass over only those.
    pub fn checkpoint(&self) -> usize {
        self.graph.len()
    }

    /// Resolved top-level objects, in stream order.
    pub fn roots(&self) -> Vec<ObjectId> {
        self.roots.iter().flatten().copied().collect()
    }

    pub fn stats(&self) -> ReadStats {
        self.stats
    }

    /// Run [`finish_from`](Self::finish_from) over the whole session.
    pub fn finish(&mut self) -> Result<ReadStats, SaveError> {
        self.finish_from(self.session_start)
    }

    /// Settle the session: every reference still missing is dropped and
    /// counted as dangling, then `finish_loading` runs on each object
    /// created since `start`, in creation order.
    pub fn finish_from(&mut self, start: usize) -> Result<ReadStats, SaveError> {
        if self.aborted {
            return Err(SaveError::SessionAborted);
        }

        let mut dangling: Vec<u32> = self.missing.drain().map(|(ptr, _)| ptr).collect();
        dangling.sort_unstable();
        for waiter in self.waiters.drain(..).flatten() {
            self.stats.dangling_references += 1;
            let mut pending = Vec::new();
            waiter.template.pending_pointers(&mut pending);
            match &waiter.target {
                Target::Property { owner, name } => {
                    if self.warn_on_missing {
                        tracing::warn!(owner = %owner, property = %name, pointers = ?pending, "dangling reference left unset");
                    } else {
                        tracing::debug!(owner = %owner, property = %name, pointers = ?pending, "dangling reference left unset");
                    }
                }
                Target::Root(slot) => {
                    tracing::warn!(slot, pointers = ?pending, "dangling top-level reference dropped");
                }
            }
        }
        if !dangling.is_empty() {
            tracing::debug!(pointers = ?dangling, "pointer ids never registered");
        }

        let start = start.max(self.session_start);
        let ids: Vec<ObjectId> = self.graph.ids().skip(start).collect();
        for id in ids {
            if let Some(object) = self.graph.get_mut(id) {
                object.finish_loading();
            }
        }
        tracing::debug!(
            objects = self.stats.objects_created,
            placeholders = self.stats.placeholders,
            dangling = self.stats.dangling_references,
            rejected = self.stats.rejected_properties,
            "finished reading token stream"
        );
        Ok(self.stats)
    }

    /// Drop everything this session built; the graph is left as it was.
    fn abort(&mut self, err: &SaveError) {
        tracing::warn!(error = %err, "discarding partially read session");
        self.aborted = true;
        self.graph.truncate(self.session_start);
        self.pointers.clear();
        self.missing.clear();
        self.waiters.clear();
        self.roots.clear();
        self.entries = Vec::new().into_iter();
    }
}

/// Read every entry of `stream` into `graph`, finish the session and return
/// the root objects.
pub fn deserialize(
    registry: &ClassRegistry,
    graph: &mut Graph,
    stream: &TokenStream,
) -> Result<Vec<ObjectId>, SaveError> {
    let mut reader = Reader::new(registry, graph, stream)?;
    while reader.read_object()?.is_some() {}
    reader.finish()?;
    Ok(reader.roots())
}
