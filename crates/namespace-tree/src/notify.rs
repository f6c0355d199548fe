//! Structural change notification.
//!
//! Views that mirror a tree (item models, outline widgets) must be told
//! about a change before it happens, so they can capture the old positions,
//! and again once it is complete. Every add, remove, rename and reparent
//! performed by [`NamespaceTree`](crate::NamespaceTree) is therefore bracketed
//! by exactly one [`StructureObserver::begin_change`] and one
//! [`StructureObserver::end_change`] call carrying the same
//! [`StructuralChange`].
//!
//! Validation runs before `begin_change`, so a failing operation produces no
//! calls at all. Operations that turn out to be no-ops (renaming a node to
//! its current name, reparenting a node under its current parent, adding a
//! node to the parent it already has) also skip the pair.

use std::sync::Arc;

use parking_lot::Mutex;
use slotmap::new_key_type;

use crate::tree::NodeId;

new_key_type! {
    /// Handle returned by [`NamespaceTree::add_observer`](crate::NamespaceTree::add_observer).
    pub struct ObserverId;
}

/// Description of a single structural mutation.
///
/// Destination indices are the positions the node occupies once the change
/// is complete, predicted before the change is made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuralChange {
    /// A parentless node is being attached to `parent` at `index`.
    Add {
        node: NodeId,
        parent: NodeId,
        index: usize,
    },
    /// The child at `index` of `parent` is being detached.
    Remove {
        node: NodeId,
        parent: NodeId,
        index: usize,
    },
    /// A node is being renamed. Indices are `None` for a root.
    Rename {
        node: NodeId,
        parent: Option<NodeId>,
        from_index: Option<usize>,
        to_index: Option<usize>,
        old_name: String,
        new_name: String,
    },
    /// A node is moving from one parent to another.
    Reparent {
        node: NodeId,
        from_parent: NodeId,
        from_index: usize,
        to_parent: NodeId,
        to_index: usize,
    },
}

impl StructuralChange {
    /// The node being added, removed or moved.
    pub fn node(&self) -> NodeId {
        match self {
            Self::Add { node, .. }
            | Self::Remove { node, .. }
            | Self::Rename { node, .. }
            | Self::Reparent { node, .. } => *node,
        }
    }
}

/// Receives begin/end notifications around tree mutations.
pub trait StructureObserver: Send {
    /// Called before the tree is modified.
    fn begin_change(&mut self, change: &StructuralChange);

    /// Called after the modification is complete.
    fn end_change(&mut self, change: &StructuralChange);
}

/// One recorded notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    Begin(StructuralChange),
    End(StructuralChange),
}

/// An observer that records every notification it receives.
///
/// Clones share the same log, so one clone can be registered with the tree
/// while another is kept to inspect or drain the events.
///
/// # Example
///
/// ```
/// use namespace_tree::{ChangeEvent, ChangeRecorder, NamespaceTree};
///
/// let mut tree = NamespaceTree::new();
/// let recorder = ChangeRecorder::new();
/// tree.add_observer(Box::new(recorder.clone()));
///
/// let root = tree.create("root", true).unwrap();
/// let child = tree.create("child", true).unwrap();
/// tree.add_child(root, child).unwrap();
///
/// let events = recorder.take();
/// assert_eq!(events.len(), 2);
/// assert!(matches!(events[0], ChangeEvent::Begin(_)));
/// assert!(matches!(events[1], ChangeEvent::End(_)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ChangeRecorder {
    events: Arc<Mutex<Vec<ChangeEvent>>>,
}

impl ChangeRecorder {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all events recorded so far.
    pub fn events(&self) -> Vec<ChangeEvent> {
        self.events.lock().clone()
    }

    /// Remove and return all events recorded so far.
    pub fn take(&self) -> Vec<ChangeEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Returns true if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Discard all recorded events.
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl StructureObserver for ChangeRecorder {
    fn begin_change(&mut self, change: &StructuralChange) {
        self.events.lock().push(ChangeEvent::Begin(change.clone()));
    }

    fn end_change(&mut self, change: &StructuralChange) {
        self.events.lock().push(ChangeEvent::End(change.clone()));
    }
}
