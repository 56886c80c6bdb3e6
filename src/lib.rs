//! Polymorphic object-graph persistence.
//!
//! Objects implement [`Saveable`] and live in a [`Graph`] arena, pointing at
//! each other through [`ObjectId`] handles. A [`Writer`] turns any set of roots
//! into a [`TokenStream`], giving shared and cyclic objects a pointer id so
//! they are written once. A [`Reader`] rebuilds them through a
//! [`ClassRegistry`], patching references that arrive before their target.
//! [`History`] is a saveable undo/redo log of immutable snapshots.

mod graph;
mod history;
mod registry;
mod saveable;
mod stream;
mod value;

pub use graph::{Graph, ObjectId};
pub use history::{History, Transition};
pub use registry::{ClassEntry, ClassRegistry, Construction};
pub use saveable::{AsAny, Properties, PropertyError, Saveable, UnknownObject};
pub use stream::{
    deserialize, load_file, save_file, serialize, PointerState, ReadStats, Reader, SaveError,
    TokenStream, Writer,
};
pub use value::{FromValue, Value, ValueKind};
