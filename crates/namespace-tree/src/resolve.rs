//! Ancestor search for property binders.
//!
//! Resolving property `name` for node `N` visits `N`, then its parent, and
//! so on up to and including the root. At each visited node the binders are
//! scanned in declaration order and every binder named `name` whose
//! criterion accepts `N`'s tags is yielded. The criterion is always checked
//! against the originating node, never against the node declaring the
//! binder.
//!
//! The resulting order is nearest node first, declaration order within a
//! node. Each call starts a fresh traversal.

use std::collections::BTreeSet;
use std::iter::FusedIterator;

use crate::binder::PropBinder;
use crate::error::{Result, TreeError};
use crate::logging::targets;
use crate::script::{ScriptArgs, ScriptEvaluator};
use crate::tree::{NamespaceTree, NodeId};
use crate::value::PropValue;

/// Iterator over the binders applicable to a node, in resolution order.
///
/// Created by [`NamespaceTree::find_binders`].
#[derive(Debug, Clone)]
pub struct BinderIter<'a> {
    tree: &'a NamespaceTree,
    prop_name: &'a str,
    tags: &'a BTreeSet<String>,
    skip_scripts: bool,
    current: Option<NodeId>,
    index: usize,
}

impl<'a> Iterator for BinderIter<'a> {
    type Item = &'a PropBinder;

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        loop {
            let data = tree.node(self.current?).ok()?;
            while let Some(binder) = data.binders.get(self.index) {
                self.index += 1;
                if binder.prop_name() == self.prop_name
                    && binder.binds_to(self.tags)
                    && !(self.skip_scripts && binder.prop_type().is_script())
                {
                    return Some(binder);
                }
            }
            self.current = data.parent;
            self.index = 0;
        }
    }
}

impl FusedIterator for BinderIter<'_> {}

impl NamespaceTree {
    /// Binders for `prop_name` applicable to `node`, nearest first.
    ///
    /// With `skip_scripts`, script-type binders are left out.
    ///
    /// # Example
    ///
    /// ```
    /// use namespace_tree::{NamespaceTree, PropBinder, PropType};
    ///
    /// let mut tree = NamespaceTree::new();
    /// let root = tree.create("root", true).unwrap();
    /// let leaf = tree.create("leaf", false).unwrap();
    /// tree.add_child(root, leaf).unwrap();
    /// tree.push_binder(root, PropBinder::new("x", PropType::String).with_value("far")).unwrap();
    /// tree.push_binder(leaf, PropBinder::new("x", PropType::String).with_value("near")).unwrap();
    ///
    /// let values: Vec<String> = tree
    ///     .find_binders(leaf, "x", false)
    ///     .unwrap()
    ///     .map(|b| b.prop_val().to_string())
    ///     .collect();
    /// assert_eq!(values, ["near", "far"]);
    /// ```
    pub fn find_binders<'a>(
        &'a self,
        node: NodeId,
        prop_name: &'a str,
        skip_scripts: bool,
    ) -> Result<BinderIter<'a>> {
        let tags = &self.node(node)?.tags;
        Ok(BinderIter {
            tree: self,
            prop_name,
            tags,
            skip_scripts,
            current: Some(node),
            index: 0,
        })
    }

    /// The nearest applicable binder, if any.
    pub fn find_first<'a>(
        &'a self,
        node: NodeId,
        prop_name: &'a str,
        skip_scripts: bool,
    ) -> Result<Option<&'a PropBinder>> {
        Ok(self.find_binders(node, prop_name, skip_scripts)?.next())
    }

    /// Stored values of the applicable binders, nearest first.
    pub fn find_values<'a>(
        &'a self,
        node: NodeId,
        prop_name: &'a str,
        skip_scripts: bool,
    ) -> Result<impl Iterator<Item = &'a PropValue> + 'a> {
        Ok(self
            .find_binders(node, prop_name, skip_scripts)?
            .map(PropBinder::prop_val))
    }

    /// The stored value of the nearest applicable binder, if any.
    pub fn find_first_value<'a>(
        &'a self,
        node: NodeId,
        prop_name: &'a str,
        skip_scripts: bool,
    ) -> Result<Option<&'a PropValue>> {
        Ok(self.find_first(node, prop_name, skip_scripts)?.map(PropBinder::prop_val))
    }

    /// The stored value of the nearest applicable binder, or `default`.
    pub fn find_value(
        &self,
        node: NodeId,
        prop_name: &str,
        skip_scripts: bool,
        default: PropValue,
    ) -> Result<PropValue> {
        Ok(self
            .find_first_value(node, prop_name, skip_scripts)?
            .cloned()
            .unwrap_or(default))
    }

    /// The effective value of `prop_name` for `node`, or `default`.
    ///
    /// Script-type binders are skipped. A scripted-value binder is evaluated
    /// through `evaluator`; its failure is returned as [`TreeError::Script`].
    pub fn resolve_value(
        &self,
        node: NodeId,
        prop_name: &str,
        evaluator: &dyn ScriptEvaluator,
        default: PropValue,
    ) -> Result<PropValue> {
        let Some(binder) = self.find_first(node, prop_name, true)? else {
            tracing::trace!(target: targets::RESOLVE, ?node, prop_name, "no binder, using default");
            return Ok(default);
        };
        binder.extract_value(evaluator, true).map_err(|err| {
            tracing::warn!(target: targets::SCRIPT, ?node, prop_name, error = %err, "scripted value failed");
            TreeError::from(err)
        })
    }

    /// Run the nearest script-type binder for `prop_name` with `args`.
    ///
    /// Fails with [`TreeError::NoApplicableScript`] if no script binder
    /// applies to `node`, and with [`TreeError::Script`] if the script fails.
    #[tracing::instrument(skip(self, evaluator, args), target = "namespace_tree::resolve", level = "trace")]
    pub fn call_script(
        &self,
        node: NodeId,
        prop_name: &str,
        evaluator: &dyn ScriptEvaluator,
        args: &ScriptArgs,
    ) -> Result<PropValue> {
        let script = self
            .find_binders(node, prop_name, false)?
            .find(|binder| binder.prop_type().is_script())
            .ok_or_else(|| TreeError::NoApplicableScript {
                prop_name: prop_name.to_string(),
                node,
            })?;
        evaluator
            .evaluate(&script.prop_val().to_string(), args)
            .map_err(|err| {
                tracing::warn!(target: targets::SCRIPT, ?node, prop_name, error = %err, "script call failed");
                TreeError::from(err)
            })
    }
}
