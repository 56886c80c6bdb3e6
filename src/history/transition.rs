use std::fmt;

use crate::value::{FromValue, Value};

/// Moves the application from one snapshot to another.
///
/// `History` calls [`apply`](Transition::apply) once per successful undo or
/// redo, with its lock held. `prev` is `None` when no state was current, as
/// after loading a history whose cursor sits at 0.
///
/// States must convert to and from [`Value`] so the history itself can be
/// saved; a state that refers to other objects should hold their
/// [`ObjectId`](crate::ObjectId)s.
pub trait Transition: Send + 'static {
    type State: Clone + fmt::Debug + Send + Into<Value> + FromValue + 'static;

    /// Class name the history is saved under.
    const CLASS_NAME: &'static str;

    fn apply(&mut self, prev: Option<&Self::State>, curr: &Self::State);
}
