//! Name paths and their string form.
//!
//! A [`TreeNamePath`] is a sequence of node names plus an absolute flag.
//! Its string form joins the names with [`PATH_SEPARATOR`] and prefixes one
//! more separator when the path is absolute:
//!
//! | Path                          | String        |
//! |-------------------------------|---------------|
//! | absolute, `[]`                | `/`           |
//! | absolute, `["a", "b"]`        | `/a/b`        |
//! | relative, `["a", "b"]`        | `a/b`         |
//! | relative, `[]`                | *(empty)*     |
//!
//! There is no escaping. Node names can never contain the separator, which
//! is what keeps the string form unambiguous.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TreeError};
use crate::logging::targets;
use crate::tree::{NamespaceTree, NodeId};

/// Separator between names in a path string.
pub const PATH_SEPARATOR: &str = "/";

/// An absolute or relative sequence of node names.
///
/// Every name is a valid node name, so encoding never fails and decoding an
/// encoded path yields the same path.
///
/// # Example
///
/// ```
/// use namespace_tree::TreeNamePath;
///
/// let path: TreeNamePath = "/shots/intro".parse().unwrap();
/// assert!(path.is_absolute());
/// assert_eq!(path.names(), ["shots", "intro"]);
/// assert_eq!(path.to_string(), "/shots/intro");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TreeNamePath {
    names: Vec<String>,
    is_absolute: bool,
}

impl TreeNamePath {
    /// Build a path, checking that every name is a valid node name.
    pub fn new<I, S>(names: I, is_absolute: bool) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if let Some(bad) = names
            .iter()
            .find(|name| NamespaceTree::validate_name(name).is_err())
        {
            return Err(TreeError::MalformedPath {
                component: bad.clone(),
            });
        }
        Ok(Self { names, is_absolute })
    }

    /// An absolute path.
    pub fn absolute<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(names, true)
    }

    /// A relative path.
    pub fn relative<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(names, false)
    }

    /// The absolute path naming the root.
    pub fn root() -> Self {
        Self {
            names: Vec::new(),
            is_absolute: true,
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn is_absolute(&self) -> bool {
        self.is_absolute
    }

    /// Number of names.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Append the names of a relative path.
    ///
    /// An absolute `other` replaces `self`, as in filesystem path joining.
    pub fn join(&self, other: &TreeNamePath) -> TreeNamePath {
        if other.is_absolute {
            return other.clone();
        }
        let mut names = self.names.clone();
        names.extend(other.names.iter().cloned());
        Self {
            names,
            is_absolute: self.is_absolute,
        }
    }

    /// The string form of the path.
    pub fn encode(&self) -> String {
        let joined = self.names.join(PATH_SEPARATOR);
        if self.is_absolute {
            format!("{PATH_SEPARATOR}{joined}")
        } else {
            joined
        }
    }

    /// Parse a path string.
    ///
    /// A leading separator marks the path absolute. The rest is split on the
    /// separator; an empty rest yields no names. Empty components, as in
    /// `a//b` or a trailing separator, are rejected with
    /// [`TreeError::MalformedPath`].
    pub fn decode(s: &str) -> Result<Self> {
        let (is_absolute, rest) = match s.strip_prefix(PATH_SEPARATOR) {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        if rest.is_empty() {
            return Ok(Self {
                names: Vec::new(),
                is_absolute,
            });
        }
        Self::new(rest.split(PATH_SEPARATOR), is_absolute)
    }
}

impl fmt::Display for TreeNamePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for TreeNamePath {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::decode(s)
    }
}

impl TryFrom<String> for TreeNamePath {
    type Error = TreeError;

    fn try_from(s: String) -> Result<Self> {
        Self::decode(&s)
    }
}

impl From<TreeNamePath> for String {
    fn from(path: TreeNamePath) -> Self {
        path.encode()
    }
}

impl NamespaceTree {
    /// Follow `path` from `start`.
    ///
    /// Absolute paths start at the root of `start`'s tree, relative ones at
    /// `start` itself. An empty path resolves to its starting node.
    pub fn resolve_path(&self, start: NodeId, path: &TreeNamePath) -> Result<NodeId> {
        let mut current = if path.is_absolute() {
            self.tree_root(start)?
        } else {
            self.node(start)?;
            start
        };

        for name in path.names() {
            current = match self.child_by_name(current, name)? {
                Some(child) => child,
                None => {
                    tracing::debug!(target: targets::TREE, path = %path, missing = %name, "path not found");
                    return Err(TreeError::PathNotFound {
                        path: path.encode(),
                        missing: name.clone(),
                    });
                }
            };
        }
        Ok(current)
    }

    /// Decode `path` and follow it from `start`.
    pub fn resolve_path_str(&self, start: NodeId, path: &str) -> Result<NodeId> {
        self.resolve_path(start, &TreeNamePath::decode(path)?)
    }

    /// The absolute path of a node. A root has an empty path.
    pub fn abs_path(&self, id: NodeId) -> Result<TreeNamePath> {
        let mut names = vec![self.name(id)?.to_string()];
        for ancestor in self.ancestors(id)? {
            names.push(self.name(ancestor)?.to_string());
        }
        // The root itself is implied by the leading separator.
        names.pop();
        names.reverse();
        Ok(TreeNamePath {
            names,
            is_absolute: true,
        })
    }
}
