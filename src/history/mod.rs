//! History - bounded undo/redo over immutable snapshots.
//!
//! `put` records the state the application has just reached; `undo` and
//! `redo` move a cursor through the recorded states and hand the
//! (previous, target) pair to a caller-supplied [`Transition`].
//!
//! ## Branching
//!
//! `put` after `undo` appends to the end of the list. The entries that were
//! "in the future" stay stored, but `redo` can no longer reach them; they go
//! away only when [`History::clear_to_size`] evicts them.
//!
//! ## Example
//!
//! ```ignore
//! use saveable_graph::{History, Transition};
//!
//! let history = History::new(Canvas::default()).with_limit(100);
//! history.put(doc_v1);
//! history.put(doc_v2);
//! assert!(history.undo());
//! assert_eq!(history.current_state(), Some(doc_v1));
//! ```

mod transition;

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError, TryLockError};

use crate::registry::ClassRegistry;
use crate::saveable::{Properties, PropertyError, Saveable};
use crate::value::Value;

pub use transition::Transition;

const STATES: &str = "states";
const NEXT_INSERT_INDEX: &str = "nextInsertIndex";

struct Inner<T: Transition> {
    states: VecDeque<T::State>,
    next_insert_index: usize,
    current: Option<T::State>,
    transition: T,
}

/// Snapshot log with a movable cursor.
///
/// Every operation takes `&self` and holds one mutex for its whole
/// read-modify-write, including the single call into the transition.
pub struct History<T: Transition> {
    inner: Mutex<Inner<T>>,
    limit: Option<usize>,
}

impl<T: Transition + Default> Default for History<T> {
    fn default() -> Self {
        History::new(T::default())
    }
}

/// Never blocks: while the lock is held elsewhere (including by the caller,
/// inside [`History::with_transition`]) only the class and limit are shown.
impl<T: Transition> fmt::Debug for History<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("History");
        out.field("class", &T::CLASS_NAME).field("limit", &self.limit);
        let inner = match self.inner.try_lock() {
            Ok(inner) => inner,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => return out.finish_non_exhaustive(),
        };
        out.field("states", &inner.states)
            .field("next_insert_index", &inner.next_insert_index)
            .field("current", &inner.current)
            .finish()
    }
}

impl<T: Transition> History<T> {
    pub fn new(transition: T) -> Self {
        History {
            inner: Mutex::new(Inner {
                states: VecDeque::new(),
                next_insert_index: 0,
                current: None,
                transition,
            }),
            limit: None,
        }
    }

    /// Keep at most `limit` states; `put` evicts the oldest beyond it.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Register this history type under [`Transition::CLASS_NAME`].
    pub fn register(registry: &ClassRegistry)
    where
        T: Default,
    {
        registry.register_type::<Self>(T::CLASS_NAME);
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record `snapshot` as the newest state and move the cursor past it.
    pub fn put(&self, snapshot: T::State) {
        let mut inner = self.lock();
        inner.states.push_back(snapshot.clone());
        inner.next_insert_index = inner.states.len();
        inner.current = Some(snapshot);
        if let Some(limit) = self.limit {
            Self::evict(&mut inner, limit);
        }
    }

    /// Step back one state. Returns false when there is nothing to undo.
    pub fn undo(&self) -> bool {
        let mut guard = self.lock();
        let inner = &mut *guard;
        if inner.next_insert_index < 2 {
            tracing::info!(
                class = T::CLASS_NAME,
                next_insert_index = inner.next_insert_index,
                "nothing to undo"
            );
            return false;
        }

        let target = inner.states[inner.next_insert_index - 2].clone();
        inner.transition.apply(inner.current.as_ref(), &target);
        inner.next_insert_index -= 1;
        inner.current = Some(target);
        true
    }

    /// Step forward one state. Returns false when there is nothing to redo.
    pub fn redo(&self) -> bool {
        let mut guard = self.lock();
        let inner = &mut *guard;
        if inner.next_insert_index >= inner.states.len() {
            tracing::info!(
                class = T::CLASS_NAME,
                next_insert_index = inner.next_insert_index,
                states = inner.states.len(),
                "nothing to redo"
            );
            return false;
        }

        let target = inner.states[inner.next_insert_index].clone();
        inner.transition.apply(inner.current.as_ref(), &target);
        inner.next_insert_index += 1;
        inner.current = Some(target);
        true
    }

    /// Evict the oldest states until at most `target` remain.
    pub fn clear_to_size(&self, target: usize) {
        let mut inner = self.lock();
        Self::evict(&mut inner, target);
    }

    fn evict(inner: &mut Inner<T>, target: usize) {
        let excess = inner.states.len().saturating_sub(target);
        if excess == 0 {
            return;
        }
        inner.states.drain(..excess);
        inner.next_insert_index = inner.next_insert_index.saturating_sub(excess);
    }

    pub fn current_state(&self) -> Option<T::State> {
        self.lock().current.clone()
    }

    /// Every stored state, oldest first, including unreachable branches.
    pub fn states(&self) -> Vec<T::State> {
        self.lock().states.iter().cloned().collect()
    }

    pub fn next_insert_index(&self) -> usize {
        self.lock().next_insert_index
    }

    pub fn len(&self) -> usize {
        self.lock().states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().states.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        self.lock().next_insert_index >= 2
    }

    pub fn can_redo(&self) -> bool {
        let inner = self.lock();
        inner.next_insert_index < inner.states.len()
    }

    /// Run `f` against the transition while holding the history lock.
    ///
    /// Calling any other method of this history from inside `f` deadlocks;
    /// only `Debug` formatting is safe there.
    pub fn with_transition<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.lock().transition)
    }
}

impl<T: Transition> Saveable for History<T> {
    fn class_name(&self) -> &str {
        T::CLASS_NAME
    }

    fn save(&self, out: &mut Properties) {
        let inner = self.lock();
        let states: Vec<Value> = inner.states.iter().cloned().map(Into::into).collect();
        out.put(STATES, Value::List(states));
        out.put(NEXT_INSERT_INDEX, inner.next_insert_index);
    }

    fn set_property(&mut self, name: &str, value: Value) -> Result<(), PropertyError> {
        let mut inner = self.lock();
        match name {
            STATES => {
                let items: Vec<Value> = value.decode(name)?;
                let mut states = VecDeque::with_capacity(items.len());
                for item in items {
                    states.push_back(item.decode::<T::State>(name)?);
                }
                inner.states = states;
            }
            NEXT_INSERT_INDEX => inner.next_insert_index = value.decode(name)?,
            _ => return Err(PropertyError::unknown(T::CLASS_NAME, name)),
        }
        Ok(())
    }

    /// Clamp the loaded cursor and re-derive the current state from it.
    fn finish_loading(&mut self) {
        let mut inner = self.lock();
        let len = inner.states.len();
        if inner.next_insert_index > len {
            tracing::warn!(
                class = T::CLASS_NAME,
                next_insert_index = inner.next_insert_index,
                states = len,
                "loaded cursor past the end, clamping"
            );
            inner.next_insert_index = len;
        }
        inner.current = match inner.next_insert_index {
            0 => None,
            index => inner.states.get(index - 1).cloned(),
        };
    }
}
