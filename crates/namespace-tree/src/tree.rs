//! The namespace tree.
//!
//! A [`NamespaceTree`] is an arena of named nodes addressed by [`NodeId`].
//! Each node has:
//! - A non-empty name that never contains [`PATH_SEPARATOR`]
//! - An optional parent, mirrored exactly by the parent's child list
//! - Children kept in lexicographic name order, unique by name
//! - A `can_have_children` flag; a node without it never has children
//! - An ordered list of [`PropBinder`]s and a set of string tags
//!
//! Any node without a parent is a root. A freshly created node is a
//! one-node tree of its own until it is attached with
//! [`add_child`](NamespaceTree::add_child); a detached subtree stays in the
//! arena, owned by the caller, until it is reattached or
//! [`destroy`](NamespaceTree::destroy)ed.
//!
//! Every mutation validates first and mutates second, so a failing call
//! leaves the tree untouched and produces no observer notifications.
//!
//! # Example
//!
//! ```
//! use namespace_tree::NamespaceTree;
//!
//! let mut tree = NamespaceTree::new();
//! let root = tree.create("project", true).unwrap();
//! let b = tree.create("b", true).unwrap();
//! let a = tree.create("a", false).unwrap();
//! tree.add_child(root, b).unwrap();
//! tree.add_child(root, a).unwrap();
//!
//! // Children are ordered by name, not insertion.
//! assert_eq!(tree.children(root).unwrap(), &[a, b]);
//! assert_eq!(tree.index_of(root, "b").unwrap(), Some(1));
//! ```

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use slotmap::{new_key_type, SlotMap};

use crate::binder::PropBinder;
use crate::config::TreeConfig;
use crate::error::{Result, TreeError};
use crate::logging::targets;
use crate::notify::{ObserverId, StructuralChange, StructureObserver};
use crate::path::PATH_SEPARATOR;

new_key_type! {
    /// A stable handle to a node in a [`NamespaceTree`].
    ///
    /// Handles survive renames and reparents. They become invalid once the
    /// node is destroyed; using one afterwards yields
    /// [`TreeError::InvalidNodeId`].
    pub struct NodeId;
}

impl NodeId {
    /// Convert the id to a raw `u64`, e.g. for an item model's internal id.
    #[inline]
    pub fn as_raw(self) -> u64 {
        use slotmap::Key;
        self.data().as_ffi()
    }

    /// Rebuild an id from [`as_raw`](Self::as_raw) output.
    ///
    /// This does not check that the node still exists.
    #[inline]
    pub fn from_raw(raw: u64) -> Self {
        Self::from(slotmap::KeyData::from_ffi(raw))
    }
}

/// Per-node storage.
#[derive(Debug)]
pub(crate) struct NodeData {
    pub(crate) name: String,
    pub(crate) parent: Option<NodeId>,
    /// Sorted by child name.
    pub(crate) children: Vec<NodeId>,
    pub(crate) can_have_children: bool,
    pub(crate) binders: Vec<PropBinder>,
    pub(crate) tags: BTreeSet<String>,
}

impl NodeData {
    fn new(name: String, can_have_children: bool) -> Self {
        Self {
            name,
            parent: None,
            children: Vec::new(),
            can_have_children,
            binders: Vec::new(),
            tags: BTreeSet::new(),
        }
    }
}

/// Arena of named nodes with structural invariants and change notification.
pub struct NamespaceTree {
    nodes: SlotMap<NodeId, NodeData>,
    observers: SlotMap<ObserverId, Box<dyn StructureObserver>>,
    config: TreeConfig,
}

impl Default for NamespaceTree {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for NamespaceTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamespaceTree")
            .field("nodes", &self.nodes.len())
            .field("observers", &self.observers.len())
            .field("config", &self.config)
            .finish()
    }
}

impl NamespaceTree {
    /// Create an empty tree with the default naming policy.
    pub fn new() -> Self {
        Self::with_config(TreeConfig::default())
    }

    /// Create an empty tree with the given naming policy.
    pub fn with_config(config: TreeConfig) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            observers: SlotMap::with_key(),
            config,
        }
    }

    /// The naming policy.
    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Number of live nodes, attached or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the arena holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Check whether a node exists.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub(crate) fn node(&self, id: NodeId) -> Result<&NodeData> {
        self.nodes.get(id).ok_or(TreeError::InvalidNodeId)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut NodeData> {
        self.nodes.get_mut(id).ok_or(TreeError::InvalidNodeId)
    }

    // =========================================================================
    // Creation and validation
    // =========================================================================

    /// Check that `name` can be used as a node name.
    pub fn validate_name(name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(TreeError::InvalidName {
                name: name.to_string(),
                reason: "name must not be empty",
            });
        }
        if name.contains(PATH_SEPARATOR) {
            return Err(TreeError::InvalidName {
                name: name.to_string(),
                reason: "name must not contain the path separator",
            });
        }
        Ok(())
    }

    /// Create a new parentless node.
    pub fn create(&mut self, name: impl Into<String>, can_have_children: bool) -> Result<NodeId> {
        let name = name.into();
        Self::validate_name(&name)?;
        let id = self.nodes.insert(NodeData::new(name, can_have_children));
        tracing::trace!(target: targets::TREE, ?id, name = %self.nodes[id].name, can_have_children, "created node");
        Ok(id)
    }

    /// Check that `parent` could accept a new child called `name`.
    pub fn verify_child_name_available(&self, parent: NodeId, name: &str) -> Result<()> {
        Self::validate_name(name)?;
        let data = self.node(parent)?;
        if !data.can_have_children {
            return Err(TreeError::NotAllowedToHaveChildren {
                node: data.name.clone(),
            });
        }
        if self.search_children(data, name).is_ok() {
            return Err(TreeError::NameConflict {
                parent: data.name.clone(),
                name: name.to_string(),
            });
        }
        Ok(())
    }

    /// Check that `node` could be attached under `parent`.
    ///
    /// Succeeds trivially when `node` is already a child of `parent`.
    pub fn verify_can_add_as_child(&self, parent: NodeId, node: NodeId) -> Result<()> {
        let parent_data = self.node(parent)?;
        let node_data = self.node(node)?;
        if node_data.parent == Some(parent) {
            return Ok(());
        }
        if node == parent || self.is_ancestor_of(node, parent)? {
            return Err(TreeError::Cycle {
                node: node_data.name.clone(),
            });
        }
        if !parent_data.can_have_children {
            return Err(TreeError::NotAllowedToHaveChildren {
                node: parent_data.name.clone(),
            });
        }
        if self.search_children(parent_data, &node_data.name).is_ok() {
            return Err(TreeError::NameConflict {
                parent: parent_data.name.clone(),
                name: node_data.name.clone(),
            });
        }
        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The node's name.
    pub fn name(&self, id: NodeId) -> Result<&str> {
        Ok(&self.node(id)?.name)
    }

    /// The node's parent, or `None` for a root.
    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.node(id)?.parent)
    }

    /// Returns true if the node has no parent.
    pub fn is_root(&self, id: NodeId) -> Result<bool> {
        Ok(self.node(id)?.parent.is_none())
    }

    /// The node's children in lexicographic name order.
    pub fn children(&self, id: NodeId) -> Result<&[NodeId]> {
        Ok(&self.node(id)?.children)
    }

    /// Whether the node may have children.
    pub fn can_have_children(&self, id: NodeId) -> Result<bool> {
        Ok(self.node(id)?.can_have_children)
    }

    /// Look up a child by name.
    pub fn child_by_name(&self, parent: NodeId, name: &str) -> Result<Option<NodeId>> {
        let data = self.node(parent)?;
        Ok(self.search_children(data, name).ok().map(|i| data.children[i]))
    }

    /// Index of the child called `name`, if there is one.
    pub fn index_of(&self, parent: NodeId, name: &str) -> Result<Option<usize>> {
        let data = self.node(parent)?;
        Ok(self.search_children(data, name).ok())
    }

    /// The child at position `index`.
    pub fn child_at_index(&self, parent: NodeId, index: usize) -> Result<NodeId> {
        let children = &self.node(parent)?.children;
        children
            .get(index)
            .copied()
            .ok_or(TreeError::ChildIndexOutOfRange {
                index,
                len: children.len(),
            })
    }

    /// The index a child called `name` has, or would have once inserted.
    pub fn child_idx_from_name(&self, parent: NodeId, name: &str) -> Result<usize> {
        let data = self.node(parent)?;
        Ok(match self.search_children(data, name) {
            Ok(index) | Err(index) => index,
        })
    }

    /// The index `node` occupies, or would occupy, among `parent`'s children.
    pub fn predict_child_index(&self, parent: NodeId, node: NodeId) -> Result<usize> {
        let name = &self.node(node)?.name;
        self.child_idx_from_name(parent, name)
    }

    /// The node's index in its parent's children, or `None` for a root.
    pub fn idx_in_parent(&self, id: NodeId) -> Result<Option<usize>> {
        let data = self.node(id)?;
        match data.parent {
            Some(parent) => self.index_of(parent, &data.name),
            None => Ok(None),
        }
    }

    /// A child name based on `prefix` that `parent` does not use yet.
    ///
    /// Returns `prefix` itself when it is free; otherwise appends the
    /// configured separator and a zero-padded counter, counting up from zero.
    pub fn suggest_child_name(&self, parent: NodeId, prefix: &str) -> Result<String> {
        let data = self.node(parent)?;
        if !data.can_have_children {
            return Err(TreeError::NotAllowedToHaveChildren {
                node: data.name.clone(),
            });
        }
        if prefix.contains(PATH_SEPARATOR) {
            return Err(TreeError::InvalidName {
                name: prefix.to_string(),
                reason: "name must not contain the path separator",
            });
        }

        let is_free = |name: &str| !name.is_empty() && self.search_children(data, name).is_err();
        if is_free(prefix) {
            return Ok(prefix.to_string());
        }
        let mut counter = 0u64;
        loop {
            let candidate = self.config.suffixed_name(prefix, counter);
            if is_free(&candidate) {
                return Ok(candidate);
            }
            counter += 1;
        }
    }

    // =========================================================================
    // Hierarchy queries
    // =========================================================================

    /// All ancestors from the immediate parent up to the root.
    pub fn ancestors(&self, id: NodeId) -> Result<Vec<NodeId>> {
        let mut result = Vec::new();
        let mut current = self.node(id)?.parent;
        while let Some(current_id) = current {
            result.push(current_id);
            current = self.nodes.get(current_id).and_then(|d| d.parent);
        }
        Ok(result)
    }

    /// The root of the tree containing `id`.
    pub fn tree_root(&self, id: NodeId) -> Result<NodeId> {
        let mut current = id;
        while let Some(parent) = self.node(current)?.parent {
            current = parent;
        }
        Ok(current)
    }

    /// Returns true if `ancestor` is a proper ancestor of `id`.
    pub fn is_ancestor_of(&self, ancestor: NodeId, id: NodeId) -> Result<bool> {
        let mut current = self.node(id)?.parent;
        while let Some(current_id) = current {
            if current_id == ancestor {
                return Ok(true);
            }
            current = self.nodes.get(current_id).and_then(|d| d.parent);
        }
        Ok(false)
    }

    /// Number of ancestors; zero for a root.
    pub fn depth(&self, id: NodeId) -> Result<usize> {
        Ok(self.ancestors(id)?.len())
    }

    /// Iterate over every parentless node in the arena.
    pub fn root_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .filter(|(_, data)| data.parent.is_none())
            .map(|(id, _)| id)
    }

    /// The node followed by its descendants, depth first, children in name order.
    pub fn depth_first_preorder(&self, id: NodeId) -> Result<Vec<NodeId>> {
        let mut result = Vec::new();
        self.depth_first_preorder_recursive(id, &mut result)?;
        Ok(result)
    }

    fn depth_first_preorder_recursive(&self, id: NodeId, result: &mut Vec<NodeId>) -> Result<()> {
        let data = self.node(id)?;
        result.push(id);
        for &child in &data.children {
            self.depth_first_preorder_recursive(child, result)?;
        }
        Ok(())
    }

    // =========================================================================
    // Structural mutation
    // =========================================================================

    /// Rename a node.
    ///
    /// Renaming to the current name is a no-op without notifications. Fails
    /// with an error for which [`TreeError::is_name_unavailable`] holds when
    /// the name is invalid or taken by a sibling. The node keeps its parent
    /// and moves to the position its new name sorts to, reported to
    /// observers as one [`StructuralChange::Rename`].
    pub fn set_name(&mut self, id: NodeId, new_name: impl Into<String>) -> Result<()> {
        let new_name = new_name.into();
        let data = self.node(id)?;
        if data.name == new_name {
            tracing::trace!(target: targets::TREE, ?id, name = %new_name, "rename to same name ignored");
            return Ok(());
        }
        if let Err(err) = Self::validate_name(&new_name) {
            tracing::debug!(target: targets::TREE, ?id, error = %err, "rename rejected");
            return Err(err);
        }
        let old_name = data.name.clone();
        let parent = data.parent;

        let (from_index, to_index) = match parent {
            Some(parent) => {
                let parent_data = self.node(parent)?;
                if self.search_children(parent_data, &new_name).is_ok() {
                    tracing::debug!(target: targets::TREE, ?id, name = %new_name, "rename rejected: sibling owns name");
                    return Err(TreeError::NameConflict {
                        parent: parent_data.name.clone(),
                        name: new_name,
                    });
                }
                let from = self.search_children(parent_data, &old_name).ok();
                let mut to = self.child_idx_from_name(parent, &new_name)?;
                if from.is_some_and(|from| to > from) {
                    to -= 1;
                }
                (from, Some(to))
            }
            None => (None, None),
        };

        let change = StructuralChange::Rename {
            node: id,
            parent,
            from_index,
            to_index,
            old_name: old_name.clone(),
            new_name: new_name.clone(),
        };
        self.with_change(change, |tree| {
            match parent {
                Some(parent) => {
                    tree.detach(parent, id);
                    tree.nodes[id].name = new_name;
                    tree.attach(parent, id);
                }
                None => tree.nodes[id].name = new_name,
            }
        });
        tracing::trace!(target: targets::TREE, ?id, from = %old_name, to = %self.nodes[id].name, "renamed node");
        Ok(())
    }

    /// Attach `child` under `parent`.
    ///
    /// A no-op when `child` is already a child of `parent`. A child that
    /// belongs to another parent is moved, reported as a
    /// [`StructuralChange::Reparent`]; a parentless one is reported as a
    /// [`StructuralChange::Add`].
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let current_parent = self.node(child)?.parent;
        if current_parent == Some(parent) {
            self.node(parent)?;
            return Ok(());
        }
        if let Err(err) = self.verify_can_add_as_child(parent, child) {
            tracing::debug!(target: targets::TREE, ?parent, ?child, error = %err, "add child rejected");
            return Err(err);
        }
        self.move_under(child, current_parent, parent)
    }

    /// Detach the child called `name` from `parent`.
    ///
    /// Returns the detached node, now a parentless root owned by the caller,
    /// or `None` if there is no such child.
    pub fn remove_child(&mut self, parent: NodeId, name: &str) -> Result<Option<NodeId>> {
        let data = self.node(parent)?;
        let Ok(index) = self.search_children(data, name) else {
            return Ok(None);
        };
        let child = data.children[index];
        self.with_change(
            StructuralChange::Remove {
                node: child,
                parent,
                index,
            },
            |tree| tree.detach(parent, child),
        );
        tracing::trace!(target: targets::TREE, ?parent, ?child, name, "removed child");
        Ok(Some(child))
    }

    /// Move `id` under `new_parent`.
    ///
    /// A no-op when `new_parent` is the current parent. Roots cannot be
    /// moved and `None` is not a valid destination, both reported as
    /// [`TreeError::RootImmutable`].
    pub fn reparent(&mut self, id: NodeId, new_parent: Option<NodeId>) -> Result<()> {
        let current_parent = self.node(id)?.parent;
        if let Some(new_parent) = new_parent {
            self.node(new_parent)?;
        }
        if current_parent == new_parent {
            return Ok(());
        }

        let result = match (current_parent, new_parent) {
            (None, _) => Err(TreeError::RootImmutable {
                reason: "cannot reparent the tree root",
            }),
            (_, None) => Err(TreeError::RootImmutable {
                reason: "cannot attach a node as a second root",
            }),
            (Some(_), Some(new_parent)) => self.verify_can_add_as_child(new_parent, id),
        };
        if let Err(err) = result {
            tracing::debug!(target: targets::TREE, ?id, ?new_parent, error = %err, "reparent rejected");
            return Err(err);
        }

        match new_parent {
            Some(new_parent) => self.move_under(id, current_parent, new_parent),
            None => Ok(()),
        }
    }

    /// Allow or forbid children.
    ///
    /// Forbidding children detaches every existing child, each reported as a
    /// [`StructuralChange::Remove`]. The detached subtrees become roots.
    #[tracing::instrument(skip(self), target = "namespace_tree::tree", level = "trace")]
    pub fn set_can_have_children(&mut self, id: NodeId, can_have_children: bool) -> Result<()> {
        self.node(id)?;
        if !can_have_children {
            while let Some(&child) = self.nodes[id].children.first() {
                self.with_change(
                    StructuralChange::Remove {
                        node: child,
                        parent: id,
                        index: 0,
                    },
                    |tree| tree.detach(id, child),
                );
                tracing::trace!(target: targets::TREE, parent = ?id, ?child, "evicted child");
            }
        }
        self.node_mut(id)?.can_have_children = can_have_children;
        Ok(())
    }

    /// Detach a non-root node and destroy its subtree.
    pub fn delete_node(&mut self, id: NodeId) -> Result<()> {
        if self.node(id)?.parent.is_none() {
            return Err(TreeError::RootImmutable {
                reason: "cannot delete the tree root",
            });
        }
        self.destroy(id)
    }

    /// Remove a node and all its descendants from the arena.
    ///
    /// An attached node is detached first, reported as a
    /// [`StructuralChange::Remove`]. Every id in the subtree becomes invalid.
    #[tracing::instrument(skip(self), target = "namespace_tree::tree", level = "trace")]
    pub fn destroy(&mut self, id: NodeId) -> Result<()> {
        let descendants = self.depth_first_preorder(id)?;
        if let Some(parent) = self.nodes[id].parent {
            let index = self.idx_in_parent(id)?.unwrap_or_default();
            self.with_change(
                StructuralChange::Remove {
                    node: id,
                    parent,
                    index,
                },
                |tree| tree.detach(parent, id),
            );
        }
        tracing::trace!(target: targets::TREE, ?id, count = descendants.len(), "destroying subtree");
        for node in descendants.into_iter().rev() {
            self.nodes.remove(node);
        }
        Ok(())
    }

    fn move_under(&mut self, id: NodeId, from: Option<NodeId>, to: NodeId) -> Result<()> {
        let to_index = self.predict_child_index(to, id)?;
        let change = match from {
            Some(from_parent) => StructuralChange::Reparent {
                node: id,
                from_parent,
                from_index: self.idx_in_parent(id)?.unwrap_or_default(),
                to_parent: to,
                to_index,
            },
            None => StructuralChange::Add {
                node: id,
                parent: to,
                index: to_index,
            },
        };
        self.with_change(change, |tree| {
            if let Some(from_parent) = from {
                tree.detach(from_parent, id);
            }
            tree.attach(to, id);
        });
        tracing::trace!(target: targets::TREE, ?id, ?from, ?to, "attached node");
        Ok(())
    }

    // =========================================================================
    // Tags
    // =========================================================================

    /// The node's tags.
    pub fn tags(&self, id: NodeId) -> Result<&BTreeSet<String>> {
        Ok(&self.node(id)?.tags)
    }

    /// Returns true if the node carries `tag`.
    pub fn has_tag(&self, id: NodeId, tag: &str) -> Result<bool> {
        Ok(self.node(id)?.tags.contains(tag))
    }

    /// Add a tag. Returns false if it was already present.
    pub fn add_tag(&mut self, id: NodeId, tag: impl Into<String>) -> Result<bool> {
        Ok(self.node_mut(id)?.tags.insert(tag.into()))
    }

    /// Remove a tag. Returns false if it was not present.
    pub fn remove_tag(&mut self, id: NodeId, tag: &str) -> Result<bool> {
        Ok(self.node_mut(id)?.tags.remove(tag))
    }

    /// Replace all tags.
    pub fn set_tags<I, S>(&mut self, id: NodeId, tags: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.node_mut(id)?.tags = tags.into_iter().map(Into::into).collect();
        Ok(())
    }

    // =========================================================================
    // Observers
    // =========================================================================

    /// Register an observer for structural changes.
    pub fn add_observer(&mut self, observer: Box<dyn StructureObserver>) -> ObserverId {
        let id = self.observers.insert(observer);
        tracing::trace!(target: targets::NOTIFY, ?id, "observer added");
        id
    }

    /// Unregister an observer, handing it back.
    pub fn remove_observer(&mut self, id: ObserverId) -> Option<Box<dyn StructureObserver>> {
        self.observers.remove(id)
    }

    /// Bracket `apply` with begin/end notifications for `change`.
    fn with_change<R>(&mut self, change: StructuralChange, apply: impl FnOnce(&mut Self) -> R) -> R {
        tracing::trace!(target: targets::NOTIFY, ?change, observers = self.observers.len(), "begin change");
        for (_, observer) in self.observers.iter_mut() {
            observer.begin_change(&change);
        }
        let result = apply(self);
        for (_, observer) in self.observers.iter_mut() {
            observer.end_change(&change);
        }
        tracing::trace!(target: targets::NOTIFY, node = ?change.node(), "end change");
        result
    }

    // =========================================================================
    // Internal helpers
    // =========================================================================

    /// Binary search `parent`'s children by name.
    fn search_children(&self, parent: &NodeData, name: &str) -> std::result::Result<usize, usize> {
        parent.children.binary_search_by(|&child| {
            self.nodes
                .get(child)
                .map_or(Ordering::Less, |data| data.name.as_str().cmp(name))
        })
    }

    /// Unlink `child` from `parent`. Callers validate beforehand.
    fn detach(&mut self, parent: NodeId, child: NodeId) {
        if let Some(parent_data) = self.nodes.get_mut(parent) {
            parent_data.children.retain(|&c| c != child);
        }
        if let Some(child_data) = self.nodes.get_mut(child) {
            child_data.parent = None;
        }
    }

    /// Link `child` under `parent` at its sorted position. Callers validate beforehand.
    fn attach(&mut self, parent: NodeId, child: NodeId) {
        let Some(name) = self.nodes.get(child).map(|d| d.name.clone()) else {
            return;
        };
        let Some(parent_data) = self.nodes.get(parent) else {
            return;
        };
        let index = match self.search_children(parent_data, &name) {
            Ok(index) | Err(index) => index,
        };
        self.nodes[parent].children.insert(index, child);
        self.nodes[child].parent = Some(parent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{ChangeEvent, ChangeRecorder};

    struct Fixture {
        tree: NamespaceTree,
        root: NodeId,
        child0: NodeId,
        grandchild0: NodeId,
        child1: NodeId,
        recorder: ChangeRecorder,
    }

    /// root -> { child0 -> { grandchild0 }, child1 }
    fn setup() -> Fixture {
        let mut tree = NamespaceTree::new();
        let root = tree.create("root", true).unwrap();
        let child0 = tree.create("child0", true).unwrap();
        let grandchild0 = tree.create("grandchild0", true).unwrap();
        let child1 = tree.create("child1", true).unwrap();
        tree.add_child(root, child0).unwrap();
        tree.add_child(child0, grandchild0).unwrap();
        tree.add_child(root, child1).unwrap();

        let recorder = ChangeRecorder::new();
        tree.add_observer(Box::new(recorder.clone()));
        Fixture {
            tree,
            root,
            child0,
            grandchild0,
            child1,
            recorder,
        }
    }

    fn names(tree: &NamespaceTree, parent: NodeId) -> Vec<String> {
        tree.children(parent)
            .unwrap()
            .iter()
            .map(|&c| tree.name(c).unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_create_validates_name() {
        let mut tree = NamespaceTree::new();
        assert!(matches!(tree.create("", true), Err(TreeError::InvalidName { .. })));
        assert!(matches!(tree.create("a/b", true), Err(TreeError::InvalidName { .. })));
        assert!(tree.is_empty());
        assert!(tree.create("ok", false).is_ok());
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_children_sorted_by_name() {
        let mut tree = NamespaceTree::new();
        let root = tree.create("root", true).unwrap();
        for name in ["delta", "alpha", "charlie", "bravo"] {
            let child = tree.create(name, false).unwrap();
            tree.add_child(root, child).unwrap();
        }
        assert_eq!(names(&tree, root), ["alpha", "bravo", "charlie", "delta"]);
        assert_eq!(tree.index_of(root, "charlie").unwrap(), Some(2));
        assert_eq!(tree.index_of(root, "echo").unwrap(), None);
        assert_eq!(tree.child_idx_from_name(root, "b").unwrap(), 1);
        let at_one = tree.child_at_index(root, 1).unwrap();
        assert_eq!(tree.name(at_one).unwrap(), "bravo");
        assert_eq!(
            tree.child_at_index(root, 4),
            Err(TreeError::ChildIndexOutOfRange { index: 4, len: 4 })
        );
    }

    #[test]
    fn test_add_child_errors() {
        let mut f = setup();
        let leaf = f.tree.create("leaf", false).unwrap();
        let other = f.tree.create("other", true).unwrap();
        assert!(matches!(
            f.tree.add_child(leaf, other),
            Err(TreeError::NotAllowedToHaveChildren { .. })
        ));

        let duplicate = f.tree.create("child0", true).unwrap();
        assert!(matches!(
            f.tree.add_child(f.root, duplicate),
            Err(TreeError::NameConflict { .. })
        ));

        assert!(matches!(
            f.tree.add_child(f.grandchild0, f.root),
            Err(TreeError::Cycle { .. })
        ));
        assert!(f.recorder.is_empty());
    }

    #[test]
    fn test_add_existing_child_is_noop() {
        let mut f = setup();
        f.tree.add_child(f.root, f.child0).unwrap();
        assert!(f.recorder.is_empty());
        assert_eq!(f.tree.children(f.root).unwrap(), &[f.child0, f.child1]);
    }

    #[test]
    fn test_add_child_moves_from_previous_parent() {
        let mut f = setup();
        f.tree.add_child(f.child1, f.grandchild0).unwrap();
        assert!(f.tree.children(f.child0).unwrap().is_empty());
        assert_eq!(f.tree.parent(f.grandchild0).unwrap(), Some(f.child1));
        assert_eq!(
            f.recorder.events()[0],
            ChangeEvent::Begin(StructuralChange::Reparent {
                node: f.grandchild0,
                from_parent: f.child0,
                from_index: 0,
                to_parent: f.child1,
                to_index: 0,
            })
        );
    }

    #[test]
    fn test_remove_child() {
        let mut f = setup();
        assert_eq!(f.tree.remove_child(f.root, "missing").unwrap(), None);
        assert!(f.recorder.is_empty());

        let removed = f.tree.remove_child(f.root, "child0").unwrap();
        assert_eq!(removed, Some(f.child0));
        assert_eq!(f.tree.parent(f.child0).unwrap(), None);
        assert_eq!(f.tree.children(f.root).unwrap(), &[f.child1]);
        // The detached subtree is intact.
        assert_eq!(f.tree.children(f.child0).unwrap(), &[f.grandchild0]);
        assert_eq!(
            f.recorder.take(),
            vec![
                ChangeEvent::Begin(StructuralChange::Remove {
                    node: f.child0,
                    parent: f.root,
                    index: 0
                }),
                ChangeEvent::End(StructuralChange::Remove {
                    node: f.child0,
                    parent: f.root,
                    index: 0
                }),
            ]
        );
    }

    #[test]
    fn test_reparent_cycle() {
        let mut f = setup();
        assert!(matches!(
            f.tree.reparent(f.child0, Some(f.grandchild0)),
            Err(TreeError::Cycle { .. })
        ));
        assert!(matches!(
            f.tree.reparent(f.child0, Some(f.child0)),
            Err(TreeError::Cycle { .. })
        ));
        assert_eq!(f.tree.parent(f.child0).unwrap(), Some(f.root));
        assert!(f.recorder.is_empty());
    }

    #[test]
    fn test_reparent_root_immutable() {
        let mut f = setup();
        let other = f.tree.create("other", true).unwrap();
        assert!(matches!(
            f.tree.reparent(f.root, Some(other)),
            Err(TreeError::RootImmutable { .. })
        ));
        assert!(matches!(
            f.tree.reparent(f.child0, None),
            Err(TreeError::RootImmutable { .. })
        ));
    }

    #[test]
    fn test_reparent_same_parent_is_noop() {
        let mut f = setup();
        f.tree.reparent(f.child0, Some(f.root)).unwrap();
        f.tree.reparent(f.root, None).unwrap();
        assert!(f.recorder.is_empty());
    }

    #[test]
    fn test_reparent_moves_subtree() {
        let mut f = setup();
        f.tree.reparent(f.child1, Some(f.child0)).unwrap();
        assert_eq!(names(&f.tree, f.child0), ["child1", "grandchild0"]);
        assert_eq!(f.tree.ancestors(f.child1).unwrap(), vec![f.child0, f.root]);
    }

    #[test]
    fn test_rename_reorders() {
        let mut f = setup();
        f.tree.set_name(f.child0, "zeta").unwrap();
        assert_eq!(names(&f.tree, f.root), ["child1", "zeta"]);
        assert_eq!(f.tree.child_by_name(f.root, "zeta").unwrap(), Some(f.child0));
        assert_eq!(
            f.recorder.events()[0],
            ChangeEvent::Begin(StructuralChange::Rename {
                node: f.child0,
                parent: Some(f.root),
                from_index: Some(0),
                to_index: Some(1),
                old_name: "child0".into(),
                new_name: "zeta".into(),
            })
        );
        assert_eq!(f.recorder.len(), 2);
    }

    #[test]
    fn test_rename_errors() {
        let mut f = setup();
        let err = f.tree.set_name(f.child1, "child0").unwrap_err();
        assert!(matches!(err, TreeError::NameConflict { .. }));
        assert!(err.is_name_unavailable());
        assert!(f.tree.set_name(f.child1, "").unwrap_err().is_name_unavailable());
        assert!(f.tree.set_name(f.child1, "a/b").unwrap_err().is_name_unavailable());
        assert_eq!(f.tree.name(f.child1).unwrap(), "child1");
        assert!(f.recorder.is_empty());
    }

    #[test]
    fn test_rename_same_name_is_silent() {
        let mut f = setup();
        f.tree.set_name(f.child1, "child1").unwrap();
        assert!(f.recorder.is_empty());
    }

    #[test]
    fn test_rename_root() {
        let mut f = setup();
        f.tree.set_name(f.root, "project").unwrap();
        assert_eq!(f.tree.name(f.root).unwrap(), "project");
        assert!(matches!(
            f.recorder.events()[0],
            ChangeEvent::Begin(StructuralChange::Rename {
                parent: None,
                from_index: None,
                to_index: None,
                ..
            })
        ));
    }

    #[test]
    fn test_predict_child_index() {
        let mut f = setup();
        let node = f.tree.create("child05", false).unwrap();
        let predicted = f.tree.predict_child_index(f.root, node).unwrap();
        f.tree.add_child(f.root, node).unwrap();
        assert_eq!(f.tree.index_of(f.root, "child05").unwrap(), Some(predicted));
        assert_eq!(predicted, 1);
    }

    #[test]
    fn test_suggest_child_name() {
        let mut f = setup();
        assert_eq!(f.tree.suggest_child_name(f.root, "fresh").unwrap(), "fresh");
        assert_eq!(
            f.tree.suggest_child_name(f.root, "child0").unwrap(),
            "child0_00000000"
        );
        let taken = f.tree.create("child0_00000000", false).unwrap();
        f.tree.add_child(f.root, taken).unwrap();
        assert_eq!(
            f.tree.suggest_child_name(f.root, "child0").unwrap(),
            "child0_00000001"
        );

        let leaf = f.tree.create("leaf", false).unwrap();
        assert!(matches!(
            f.tree.suggest_child_name(leaf, "x"),
            Err(TreeError::NotAllowedToHaveChildren { .. })
        ));
    }

    #[test]
    fn test_suggest_child_name_custom_config() {
        let mut tree = NamespaceTree::with_config(TreeConfig::default().with_suffix_width(2));
        let root = tree.create("root", true).unwrap();
        let clip = tree.create("clip", false).unwrap();
        tree.add_child(root, clip).unwrap();
        assert_eq!(tree.suggest_child_name(root, "clip").unwrap(), "clip_00");
    }

    #[test]
    fn test_forbid_children_evicts() {
        let mut f = setup();
        f.tree.set_can_have_children(f.root, false).unwrap();
        assert!(f.tree.children(f.root).unwrap().is_empty());
        assert_eq!(f.tree.parent(f.child0).unwrap(), None);
        assert_eq!(f.tree.parent(f.child1).unwrap(), None);
        assert!(f.tree.contains(f.grandchild0));
        assert!(!f.tree.can_have_children(f.root).unwrap());

        let events = f.recorder.take();
        assert_eq!(events.len(), 4);
        assert!(events.iter().all(|e| matches!(
            e,
            ChangeEvent::Begin(StructuralChange::Remove { index: 0, .. })
                | ChangeEvent::End(StructuralChange::Remove { index: 0, .. })
        )));
    }

    #[test]
    fn test_delete_node() {
        let mut f = setup();
        assert!(matches!(
            f.tree.delete_node(f.root),
            Err(TreeError::RootImmutable { .. })
        ));
        f.tree.delete_node(f.child0).unwrap();
        assert!(!f.tree.contains(f.child0));
        assert!(!f.tree.contains(f.grandchild0));
        assert_eq!(f.tree.children(f.root).unwrap(), &[f.child1]);
        assert_eq!(f.tree.name(f.child0), Err(TreeError::InvalidNodeId));
        assert_eq!(f.recorder.len(), 2);
    }

    #[test]
    fn test_hierarchy_queries() {
        let f = setup();
        assert_eq!(f.tree.ancestors(f.grandchild0).unwrap(), vec![f.child0, f.root]);
        assert_eq!(f.tree.tree_root(f.grandchild0).unwrap(), f.root);
        assert_eq!(f.tree.depth(f.grandchild0).unwrap(), 2);
        assert!(f.tree.is_ancestor_of(f.root, f.grandchild0).unwrap());
        assert!(!f.tree.is_ancestor_of(f.grandchild0, f.grandchild0).unwrap());
        assert_eq!(f.tree.idx_in_parent(f.child1).unwrap(), Some(1));
        assert_eq!(f.tree.idx_in_parent(f.root).unwrap(), None);
        assert_eq!(
            f.tree.depth_first_preorder(f.root).unwrap(),
            vec![f.root, f.child0, f.grandchild0, f.child1]
        );
        assert_eq!(f.tree.root_nodes().collect::<Vec<_>>(), vec![f.root]);
    }

    #[test]
    fn test_tags() {
        let mut f = setup();
        assert!(f.tree.add_tag(f.child0, "A").unwrap());
        assert!(!f.tree.add_tag(f.child0, "A").unwrap());
        assert!(f.tree.has_tag(f.child0, "A").unwrap());
        f.tree.set_tags(f.child0, ["B", "C"]).unwrap();
        assert!(!f.tree.has_tag(f.child0, "A").unwrap());
        assert!(f.tree.remove_tag(f.child0, "B").unwrap());
        assert_eq!(f.tree.tags(f.child0).unwrap().len(), 1);
    }

    #[test]
    fn test_remove_observer() {
        let mut f = setup();
        let mut tree = NamespaceTree::new();
        let recorder = ChangeRecorder::new();
        let id = tree.add_observer(Box::new(recorder.clone()));
        assert!(tree.remove_observer(id).is_some());
        let a = tree.create("a", true).unwrap();
        let b = tree.create("b", true).unwrap();
        tree.add_child(a, b).unwrap();
        assert!(recorder.is_empty());

        f.tree.remove_child(f.root, "child1").unwrap();
        assert_eq!(f.recorder.len(), 2);
    }

    #[test]
    fn test_verify_child_name_available() {
        let f = setup();
        assert!(f.tree.verify_child_name_available(f.root, "child2").is_ok());
        assert!(matches!(
            f.tree.verify_child_name_available(f.root, "child1"),
            Err(TreeError::NameConflict { .. })
        ));
        assert!(matches!(
            f.tree.verify_child_name_available(f.root, ""),
            Err(TreeError::InvalidName { .. })
        ));
        assert!(f.tree.verify_can_add_as_child(f.root, f.child0).is_ok());
        assert!(matches!(
            f.tree.verify_can_add_as_child(f.grandchild0, f.child0),
            Err(TreeError::Cycle { .. })
        ));
    }

    #[test]
    fn test_raw_id_round_trip() {
        let f = setup();
        assert_eq!(NodeId::from_raw(f.child0.as_raw()), f.child0);
    }
}
