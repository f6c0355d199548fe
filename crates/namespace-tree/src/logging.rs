//! Logging and debugging facilities.
//!
//! This module provides:
//! - The `tracing` targets used by every module, for log filtering
//! - Text dumps of namespace trees for debugging
//!
//! # Tracing Integration
//!
//! The crate emits `tracing` events but installs no subscriber. To see
//! them, install one in the host application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("namespace_tree::resolve=trace")
//!     .init();
//! ```
//!
//! # Debug Visualization
//!
//! ```
//! use namespace_tree::logging::{TreeDebug, TreeFormatOptions};
//! use namespace_tree::NamespaceTree;
//!
//! let mut tree = NamespaceTree::new();
//! let root = tree.create("project", true).unwrap();
//! let shots = tree.create("shots", true).unwrap();
//! tree.add_child(root, shots).unwrap();
//!
//! let debug = TreeDebug::with_options(TreeFormatOptions::minimal());
//! let output = debug.format_subtree(&tree, root).unwrap();
//! assert!(output.contains("shots"));
//! ```

use crate::error::Result;
use crate::tree::{NamespaceTree, NodeId};

/// Target names for log filtering.
pub mod targets {
    /// Structural operations on the tree.
    pub const TREE: &str = "namespace_tree::tree";
    /// Binder store mutations and type conversion.
    pub const BINDER: &str = "namespace_tree::binder";
    /// Ancestor search.
    pub const RESOLVE: &str = "namespace_tree::resolve";
    /// Script evaluation failures.
    pub const SCRIPT: &str = "namespace_tree::script";
    /// Begin/end change notifications.
    pub const NOTIFY: &str = "namespace_tree::notify";
}

/// Style options for tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Compact single-line representation.
    Compact,
}

/// Configuration for tree debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    pub style: TreeStyle,
    /// Whether to show node IDs.
    pub show_ids: bool,
    /// Whether to show node tags.
    pub show_tags: bool,
    /// Whether to list each node's binders.
    pub show_binders: bool,
    /// Maximum depth to traverse (None for unlimited).
    pub max_depth: Option<usize>,
    /// Indent size for each level.
    pub indent_size: usize,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_ids: true,
            show_tags: true,
            show_binders: false,
            max_depth: None,
            indent_size: 2,
        }
    }
}

impl TreeFormatOptions {
    /// Options for detailed debugging output.
    pub fn detailed() -> Self {
        Self {
            show_binders: true,
            ..Default::default()
        }
    }

    /// Options for names only.
    pub fn minimal() -> Self {
        Self {
            show_ids: false,
            show_tags: false,
            show_binders: false,
            ..Default::default()
        }
    }
}

/// Renders namespace trees as indented text.
#[derive(Debug, Clone, Default)]
pub struct TreeDebug {
    options: TreeFormatOptions,
}

impl TreeDebug {
    /// Create a visualizer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Format every tree in the arena, one per root.
    pub fn format_all(&self, tree: &NamespaceTree) -> Result<String> {
        let roots: Vec<NodeId> = tree.root_nodes().collect();
        let mut output = format!("Namespace Tree ({} total nodes):\n", tree.len());
        if roots.is_empty() {
            output.push_str("  (empty)\n");
        }
        for root in roots {
            self.format_subtree_into(tree, root, 0, true, &mut output)?;
        }
        Ok(output)
    }

    /// Format the subtree rooted at `id`.
    pub fn format_subtree(&self, tree: &NamespaceTree, id: NodeId) -> Result<String> {
        let mut output = String::new();
        self.format_subtree_into(tree, id, 0, true, &mut output)?;
        Ok(output)
    }

    fn format_subtree_into(
        &self,
        tree: &NamespaceTree,
        id: NodeId,
        depth: usize,
        is_last: bool,
        output: &mut String,
    ) -> Result<()> {
        if self.options.max_depth.is_some_and(|max| depth > max) {
            return Ok(());
        }

        output.push_str(&self.build_prefix(depth, is_last));
        output.push_str(tree.name(id)?);

        if self.options.show_ids {
            output.push_str(&format!(" [{id:?}]"));
        }
        if self.options.show_tags {
            let tags = tree.tags(id)?;
            if !tags.is_empty() {
                let joined: Vec<&str> = tags.iter().map(String::as_str).collect();
                output.push_str(&format!(" {{{}}}", joined.join(", ")));
            }
        }
        if !tree.can_have_children(id)? {
            output.push_str(" (leaf)");
        }
        output.push('\n');

        if self.options.show_binders {
            let prefix = self.build_binder_prefix(depth);
            for binder in tree.binders(id)? {
                output.push_str(&format!(
                    "{prefix}  .{}: {} = {:?}",
                    binder.prop_name(),
                    binder.prop_type(),
                    binder.prop_val().to_string()
                ));
                if !binder.bind_criterion().is_empty() {
                    output.push_str(&format!(" when [{}]", binder.bind_criterion()));
                }
                output.push('\n');
            }
        }

        let children = tree.children(id)?;
        for (i, &child) in children.iter().enumerate() {
            self.format_subtree_into(tree, child, depth + 1, i + 1 == children.len(), output)?;
        }
        Ok(())
    }

    fn build_prefix(&self, depth: usize, is_last: bool) -> String {
        if depth == 0 {
            return String::new();
        }

        let (branch, tee, corner) = match self.options.style {
            TreeStyle::Ascii => ("|", "+--", "`--"),
            TreeStyle::Unicode => ("\u{2502}", "\u{251c}\u{2500}\u{2500}", "\u{2514}\u{2500}\u{2500}"),
            TreeStyle::Compact => ("", "-", "-"),
        };

        let mut prefix = String::new();
        for _ in 0..(depth - 1) {
            prefix.push_str(branch);
            prefix.push_str(&" ".repeat(self.options.indent_size));
        }
        prefix.push_str(if is_last { corner } else { tee });
        prefix.push(' ');
        prefix
    }

    fn build_binder_prefix(&self, depth: usize) -> String {
        let branch = match self.options.style {
            TreeStyle::Ascii => "|",
            TreeStyle::Unicode => "\u{2502}",
            TreeStyle::Compact => "",
        };
        let mut prefix = String::new();
        for _ in 0..depth {
            prefix.push_str(branch);
            prefix.push_str(&" ".repeat(self.options.indent_size));
        }
        prefix
    }
}
