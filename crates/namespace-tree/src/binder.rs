//! Property binders and the per-node binder store.
//!
//! A [`PropBinder`] offers a value for a named property to the node it is
//! attached to and to every descendant whose tags satisfy the binder's
//! [`PropBindCriterion`]. Each node keeps its binders in an ordered list;
//! the order is the declaration order seen by ancestor search and is never
//! re-sorted.
//!
//! # Example
//!
//! ```
//! use namespace_tree::{NamespaceTree, PropBindCriterion, PropBinder, PropType};
//!
//! let mut tree = NamespaceTree::new();
//! let root = tree.create("root", true).unwrap();
//!
//! let binder = PropBinder::new("color", PropType::String)
//!     .with_value("red")
//!     .with_criterion(PropBindCriterion::from_tags(["shape"]));
//! tree.push_binder(root, binder).unwrap();
//!
//! assert_eq!(tree.binder_count(root).unwrap(), 1);
//! assert_eq!(tree.binder(root, 0).unwrap().prop_name(), "color");
//! ```

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScriptError, TreeError};
use crate::logging::targets;
use crate::prop_type::PropType;
use crate::script::{ScriptArgs, ScriptEvaluator};
use crate::tree::{NamespaceTree, NodeId};
use crate::value::PropValue;

/// The tags a node must carry for a binder to apply to it.
///
/// Matching has set semantics: every required tag must be present, and an
/// empty criterion matches every node. Tags iterate in sorted order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropBindCriterion {
    tags: BTreeSet<String>,
}

impl PropBindCriterion {
    /// A criterion matching every node.
    pub fn new() -> Self {
        Self::default()
    }

    /// A criterion requiring all of `tags`.
    pub fn from_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    /// The required tags.
    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    /// Require another tag. Returns false if it was already required.
    pub fn insert(&mut self, tag: impl Into<String>) -> bool {
        self.tags.insert(tag.into())
    }

    /// Drop a requirement. Returns false if it was not required.
    pub fn remove(&mut self, tag: &str) -> bool {
        self.tags.remove(tag)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Returns true if `tags` contains every required tag.
    pub fn is_satisfied_by(&self, tags: &BTreeSet<String>) -> bool {
        self.tags.is_subset(tags)
    }
}

impl<S: Into<String>> FromIterator<S> for PropBindCriterion {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::from_tags(iter)
    }
}

impl fmt::Display for PropBindCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for tag in &self.tags {
            if !first {
                f.write_str(", ")?;
            }
            f.write_str(tag)?;
            first = false;
        }
        Ok(())
    }
}

/// A `(name, type, value, criterion)` record attached to a node.
#[derive(Debug, Clone, PartialEq)]
pub struct PropBinder {
    prop_name: String,
    prop_type: PropType,
    prop_val: PropValue,
    bind_criterion: PropBindCriterion,
}

impl PropBinder {
    /// Create a binder holding a copy of the type's default value and an
    /// empty criterion.
    pub fn new(prop_name: impl Into<String>, prop_type: PropType) -> Self {
        let prop_val = prop_type.default_value();
        Self {
            prop_name: prop_name.into(),
            prop_type,
            prop_val,
            bind_criterion: PropBindCriterion::new(),
        }
    }

    /// Replace the stored value without conversion.
    pub fn with_value(mut self, value: impl Into<PropValue>) -> Self {
        self.prop_val = value.into();
        self
    }

    pub fn with_criterion(mut self, criterion: PropBindCriterion) -> Self {
        self.bind_criterion = criterion;
        self
    }

    pub fn prop_name(&self) -> &str {
        &self.prop_name
    }

    pub fn prop_type(&self) -> &PropType {
        &self.prop_type
    }

    /// The stored value. For scripted types this is the script source.
    pub fn prop_val(&self) -> &PropValue {
        &self.prop_val
    }

    pub fn bind_criterion(&self) -> &PropBindCriterion {
        &self.bind_criterion
    }

    pub fn set_prop_name(&mut self, name: impl Into<String>) {
        self.prop_name = name.into();
    }

    /// Replace the stored value without conversion.
    pub fn set_prop_val(&mut self, value: impl Into<PropValue>) {
        self.prop_val = value.into();
    }

    pub fn set_bind_criterion(&mut self, criterion: PropBindCriterion) {
        self.bind_criterion = criterion;
    }

    /// Change the type, converting the stored value.
    ///
    /// Leaving a scripted type for a non-scripted one evaluates the stored
    /// source first; a script failure is returned and the binder is left
    /// unchanged. A value the new type rejects becomes the new type's
    /// default. Type and value are only updated together.
    pub fn set_prop_type(
        &mut self,
        new_type: PropType,
        evaluator: &dyn ScriptEvaluator,
    ) -> std::result::Result<(), ScriptError> {
        let value = new_type.convert_from(&self.prop_val, &self.prop_type, evaluator)?;
        self.prop_val = value;
        self.prop_type = new_type;
        Ok(())
    }

    /// The binder's effective value.
    ///
    /// With `apply_scripts`, a scripted-value binder runs its source through
    /// `evaluator` with no arguments. Otherwise the stored value is returned.
    pub fn extract_value(
        &self,
        evaluator: &dyn ScriptEvaluator,
        apply_scripts: bool,
    ) -> std::result::Result<PropValue, ScriptError> {
        if apply_scripts && self.prop_type.uses_scripted_value() {
            evaluator.evaluate(&self.prop_val.to_string(), &ScriptArgs::new())
        } else {
            Ok(self.prop_val.clone())
        }
    }

    /// Returns true if the criterion accepts a node carrying `tags`.
    pub fn binds_to(&self, tags: &BTreeSet<String>) -> bool {
        self.bind_criterion.is_satisfied_by(tags)
    }
}

impl NamespaceTree {
    /// The node's binders in declaration order.
    pub fn binders(&self, node: NodeId) -> Result<&[PropBinder]> {
        Ok(&self.node(node)?.binders)
    }

    /// The binder at `index`.
    pub fn binder(&self, node: NodeId, index: usize) -> Result<&PropBinder> {
        let binders = &self.node(node)?.binders;
        binders.get(index).ok_or(TreeError::BinderIndexOutOfRange {
            index,
            len: binders.len(),
        })
    }

    /// Number of binders on the node.
    pub fn binder_count(&self, node: NodeId) -> Result<usize> {
        Ok(self.node(node)?.binders.len())
    }

    /// Insert a binder at `index`, shifting later binders back.
    ///
    /// `index` may equal the binder count to append.
    pub fn insert_binder(&mut self, node: NodeId, index: usize, binder: PropBinder) -> Result<()> {
        let binders = &mut self.node_mut(node)?.binders;
        if index > binders.len() {
            return Err(TreeError::BinderIndexOutOfRange {
                index,
                len: binders.len(),
            });
        }
        tracing::trace!(target: targets::BINDER, ?node, index, name = binder.prop_name(), "inserted binder");
        binders.insert(index, binder);
        Ok(())
    }

    /// Append a binder, returning its index.
    pub fn push_binder(&mut self, node: NodeId, binder: PropBinder) -> Result<usize> {
        let index = self.binder_count(node)?;
        self.insert_binder(node, index, binder)?;
        Ok(index)
    }

    /// Remove and return the binder at `index`.
    pub fn remove_binder(&mut self, node: NodeId, index: usize) -> Result<PropBinder> {
        let binders = &mut self.node_mut(node)?.binders;
        if index >= binders.len() {
            return Err(TreeError::BinderIndexOutOfRange {
                index,
                len: binders.len(),
            });
        }
        let binder = binders.remove(index);
        tracing::trace!(target: targets::BINDER, ?node, index, name = binder.prop_name(), "removed binder");
        Ok(binder)
    }

    /// Move the binder at `from` so it ends up at `to`, keeping the relative
    /// order of the others.
    pub fn move_binder(&mut self, node: NodeId, from: usize, to: usize) -> Result<()> {
        let binders = &mut self.node_mut(node)?.binders;
        let len = binders.len();
        if let Some(index) = [from, to].into_iter().find(|&i| i >= len) {
            return Err(TreeError::BinderIndexOutOfRange { index, len });
        }
        let binder = binders.remove(from);
        binders.insert(to, binder);
        tracing::trace!(target: targets::BINDER, ?node, from, to, "moved binder");
        Ok(())
    }

    /// Rename the binder at `index`.
    pub fn set_binder_name(
        &mut self,
        node: NodeId,
        index: usize,
        name: impl Into<String>,
    ) -> Result<()> {
        let binder = self.binder_mut(node, index)?;
        binder.set_prop_name(name);
        tracing::trace!(target: targets::BINDER, ?node, index, name = binder.prop_name(), "renamed binder");
        Ok(())
    }

    /// Replace the value of the binder at `index` without conversion.
    pub fn set_binder_value(
        &mut self,
        node: NodeId,
        index: usize,
        value: impl Into<PropValue>,
    ) -> Result<()> {
        self.binder_mut(node, index)?.set_prop_val(value);
        tracing::trace!(target: targets::BINDER, ?node, index, "set binder value");
        Ok(())
    }

    /// Replace the criterion of the binder at `index`.
    pub fn set_binder_criterion(
        &mut self,
        node: NodeId,
        index: usize,
        criterion: PropBindCriterion,
    ) -> Result<()> {
        tracing::trace!(target: targets::BINDER, ?node, index, %criterion, "set binder criterion");
        self.binder_mut(node, index)?.set_bind_criterion(criterion);
        Ok(())
    }

    /// Change the type of the binder at `index`, converting its value.
    ///
    /// See [`PropBinder::set_prop_type`]. A script failure surfaces as
    /// [`TreeError::Script`] and leaves the binder unchanged.
    #[tracing::instrument(
        skip(self, new_type, evaluator),
        fields(to = new_type.name()),
        target = "namespace_tree::binder",
        level = "trace"
    )]
    pub fn set_binder_type(
        &mut self,
        node: NodeId,
        index: usize,
        new_type: PropType,
        evaluator: &dyn ScriptEvaluator,
    ) -> Result<()> {
        let binder = self.binder_mut(node, index)?;
        if let Err(err) = binder.set_prop_type(new_type, evaluator) {
            tracing::warn!(target: targets::SCRIPT, ?node, index, error = %err, "type change aborted by script failure");
            return Err(err.into());
        }
        Ok(())
    }

    fn binder_mut(&mut self, node: NodeId, index: usize) -> Result<&mut PropBinder> {
        let binders = &mut self.node_mut(node)?.binders;
        let len = binders.len();
        binders
            .get_mut(index)
            .ok_or(TreeError::BinderIndexOutOfRange { index, len })
    }
}
