//! Named namespace trees with layered property resolution.
//!
//! This crate provides:
//!
//! - **Namespace Tree**: an arena of uniquely named nodes kept in name order,
//!   with rename, reparent, cycle detection and child-index prediction
//! - **Paths**: absolute and relative name paths and their `/`-separated form
//! - **Change Notification**: begin/end hooks around every structural change
//! - **Property Binders**: per-node `(name, type, value, criterion)` records
//! - **Binding Resolution**: nearest-ancestor-first search for a property,
//!   filtered by tag criteria
//! - **Prop Types**: value kinds with conversion and default fallback
//! - **Scripts**: a pluggable evaluator for scripted values and script binders
//!
//! # Example
//!
//! ```
//! use namespace_tree::{NamespaceTree, PropBindCriterion, PropBinder, PropType, PropValue};
//!
//! let mut tree = NamespaceTree::new();
//! let project = tree.create("project", true).unwrap();
//! let shot = tree.create("shot", true).unwrap();
//! let title = tree.create("title", false).unwrap();
//! tree.add_child(project, shot).unwrap();
//! tree.add_child(shot, title).unwrap();
//! tree.add_tag(title, "text").unwrap();
//!
//! // Declared on the project, applied to any tagged descendant.
//! let font = PropBinder::new("font", PropType::String)
//!     .with_value("Sans")
//!     .with_criterion(PropBindCriterion::from_tags(["text"]));
//! tree.push_binder(project, font).unwrap();
//!
//! let found = tree.find_value(title, "font", false, PropValue::Null).unwrap();
//! assert_eq!(found, PropValue::from("Sans"));
//! assert_eq!(tree.find_value(shot, "font", false, PropValue::Null).unwrap(), PropValue::Null);
//!
//! let node = tree.resolve_path_str(project, "/shot/title").unwrap();
//! assert_eq!(node, title);
//! ```

pub mod binder;
pub mod config;
pub mod error;
pub mod logging;
pub mod notify;
pub mod path;
pub mod prop_type;
pub mod resolve;
pub mod script;
pub mod tree;
pub mod value;

pub use binder::{PropBindCriterion, PropBinder};
pub use config::TreeConfig;
pub use error::{ConversionError, Result, ScriptError, TreeError};
pub use logging::{TreeDebug, TreeFormatOptions, TreeStyle};
pub use notify::{ChangeEvent, ChangeRecorder, ObserverId, StructuralChange, StructureObserver};
pub use path::{TreeNamePath, PATH_SEPARATOR};
pub use prop_type::{CustomPropType, PropConverter, PropType, PropTypeRegistry};
pub use resolve::BinderIter;
pub use script::{NoScripting, ScriptArgs, ScriptEvaluator, SCRIPT_ENTRY_POINT};
pub use tree::{NamespaceTree, NodeId};
pub use value::PropValue;

static_assertions::assert_impl_all!(NodeId: Copy, Send, Sync);
static_assertions::assert_impl_all!(NamespaceTree: Send);
static_assertions::assert_impl_all!(PropBinder: Send, Sync);
static_assertions::assert_impl_all!(ChangeRecorder: Send, Sync);
