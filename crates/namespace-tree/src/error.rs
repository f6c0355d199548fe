//! Error types for namespace trees and property binding.

use crate::tree::NodeId;

/// Result type alias for tree operations.
pub type Result<T> = std::result::Result<T, TreeError>;

/// Errors that can occur while mutating or querying a [`NamespaceTree`](crate::NamespaceTree).
///
/// Every structural error is reported before any mutation takes place, so a
/// failed call always leaves the tree exactly as it was.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TreeError {
    /// The node ID is invalid or its node has been destroyed.
    #[error("Invalid or destroyed node ID")]
    InvalidNodeId,

    /// The name is empty or contains the path separator.
    #[error("Invalid node name '{name}': {reason}")]
    InvalidName { name: String, reason: &'static str },

    /// The parent already has a different child with this name.
    #[error("Node '{parent}' already has a child named '{name}'")]
    NameConflict { parent: String, name: String },

    /// The node is not allowed to have children.
    #[error("Node '{node}' is not allowed to have children")]
    NotAllowedToHaveChildren { node: String },

    /// The operation would make a node its own ancestor.
    #[error("Cannot make node '{node}' a descendant of itself")]
    Cycle { node: String },

    /// The operation would move or delete a tree root, or create a second root.
    #[error("Tree roots are immutable: {reason}")]
    RootImmutable { reason: &'static str },

    /// A path component could not be resolved.
    #[error("Failed to resolve path '{path}': no child named '{missing}'")]
    PathNotFound { path: String, missing: String },

    /// A path contains a component that is not a valid node name.
    #[error("Malformed path component '{component}'")]
    MalformedPath { component: String },

    /// A child index is past the end of a node's children.
    #[error("Child index {index} out of range (node has {len} children)")]
    ChildIndexOutOfRange { index: usize, len: usize },

    /// A binder index is past the end of a node's binder list.
    #[error("Binder index {index} out of range (node has {len} binders)")]
    BinderIndexOutOfRange { index: usize, len: usize },

    /// A custom prop type with this name is already registered.
    #[error("Prop type '{0}' is already registered")]
    DuplicatePropType(String),

    /// An external script failed.
    #[error(transparent)]
    Script(#[from] ScriptError),

    /// Ancestor search found no script-type binder for the property.
    #[error("No applicable script bound to property '{prop_name}'")]
    NoApplicableScript { prop_name: String, node: NodeId },
}

impl TreeError {
    /// Returns `true` for the errors a rename reports when the requested name
    /// cannot be used: an invalid name, or one a sibling already owns.
    pub fn is_name_unavailable(&self) -> bool {
        matches!(self, Self::InvalidName { .. } | Self::NameConflict { .. })
    }

    /// Returns `true` if this error came from a failing script.
    pub fn is_script_failure(&self) -> bool {
        matches!(self, Self::Script(_))
    }
}

/// A script failed to compile, failed while running, or did not define the
/// expected entry point.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Script failed: {message}")]
pub struct ScriptError {
    /// Human-readable failure description from the evaluator.
    pub message: String,
}

impl ScriptError {
    /// Create a script failure with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A prop type could not represent the given value.
///
/// Conversion errors never escape a type change; they select the new
/// type's default value instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Cannot convert value to '{target}': {message}")]
pub struct ConversionError {
    /// Name of the prop type that rejected the value.
    pub target: String,
    /// Reason for the rejection.
    pub message: String,
}

impl ConversionError {
    /// Create a conversion error.
    pub fn new(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_unavailable_category() {
        let invalid = TreeError::InvalidName {
            name: String::new(),
            reason: "name must not be empty",
        };
        let conflict = TreeError::NameConflict {
            parent: "root".into(),
            name: "a".into(),
        };
        assert!(invalid.is_name_unavailable());
        assert!(conflict.is_name_unavailable());
        assert!(!TreeError::InvalidNodeId.is_name_unavailable());
    }

    #[test]
    fn test_script_error_conversion() {
        let err: TreeError = ScriptError::new("boom").into();
        assert!(err.is_script_failure());
        assert_eq!(err.to_string(), "Script failed: boom");
    }
}
