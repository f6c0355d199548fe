//! Property value kinds and conversion between them.
//!
//! Each binder declares a [`PropType`]. The type decides the binder's default
//! value, whether the stored value is script source that produces the real
//! value (`uses_scripted_value`), and how a value of another type is
//! converted when the binder's type changes.
//!
//! # Built-in Types
//!
//! | Type             | Default | Scripted | Conversion          |
//! |------------------|---------|----------|---------------------|
//! | `String`         | `""`    | no       | string form of value|
//! | `ScriptedValue`  | `""`    | yes      | string form of value|
//! | `Script`         | `""`    | no       | string form of value|
//!
//! Hosts add their own kinds with [`PropType::Custom`].

use std::fmt;
use std::sync::Arc;

use crate::error::{ConversionError, ScriptError, TreeError};
use crate::logging::targets;
use crate::script::{ScriptArgs, ScriptEvaluator};
use crate::value::PropValue;

/// Conversion function for a custom prop type.
///
/// Receives the value to convert and the type it currently belongs to.
pub type PropConverter =
    Arc<dyn Fn(&PropValue, &PropType) -> Result<PropValue, ConversionError> + Send + Sync>;

/// A host-defined prop type.
#[derive(Clone)]
pub struct CustomPropType {
    name: String,
    default_value: PropValue,
    uses_scripted_value: bool,
    converter: PropConverter,
}

impl CustomPropType {
    /// Create a custom type with the given name, default value and converter.
    pub fn new<F>(name: impl Into<String>, default_value: PropValue, converter: F) -> Self
    where
        F: Fn(&PropValue, &PropType) -> Result<PropValue, ConversionError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            default_value,
            uses_scripted_value: false,
            converter: Arc::new(converter),
        }
    }

    /// Mark values of this type as script source.
    pub fn scripted(mut self) -> Self {
        self.uses_scripted_value = true;
        self
    }
}

impl fmt::Debug for CustomPropType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomPropType")
            .field("name", &self.name)
            .field("default_value", &self.default_value)
            .field("uses_scripted_value", &self.uses_scripted_value)
            .finish_non_exhaustive()
    }
}

/// The declared kind of a property binder's value.
#[derive(Debug, Clone)]
pub enum PropType {
    /// Plain string values.
    String,
    /// Values produced by running the stored script source.
    ScriptedValue,
    /// Script source invoked by [`call_script`](crate::NamespaceTree::call_script).
    Script,
    /// A host-defined type.
    Custom(CustomPropType),
}

impl PropType {
    /// User-visible name of the type.
    pub fn name(&self) -> &str {
        match self {
            Self::String => "String",
            Self::ScriptedValue => "Scripted Value",
            Self::Script => "Script",
            Self::Custom(custom) => &custom.name,
        }
    }

    /// A fresh copy of the type's default value.
    pub fn default_value(&self) -> PropValue {
        match self {
            Self::String | Self::ScriptedValue | Self::Script => PropValue::String(String::new()),
            Self::Custom(custom) => custom.default_value.clone(),
        }
    }

    /// Whether the stored value is source for a script producing the value.
    pub fn uses_scripted_value(&self) -> bool {
        match self {
            Self::ScriptedValue => true,
            Self::String | Self::Script => false,
            Self::Custom(custom) => custom.uses_scripted_value,
        }
    }

    /// Whether this is the script kind.
    pub fn is_script(&self) -> bool {
        matches!(self, Self::Script)
    }

    /// Convert a value that currently belongs to `from` into this type.
    ///
    /// This is the raw conversion; it does not evaluate scripts and does not
    /// fall back to the default value.
    pub fn convert(&self, value: &PropValue, from: &PropType) -> Result<PropValue, ConversionError> {
        match self {
            Self::String | Self::ScriptedValue | Self::Script => {
                Ok(PropValue::String(value.to_string()))
            }
            Self::Custom(custom) => (custom.converter)(value, from),
        }
    }

    /// Convert a value of type `from` into this type, the way a binder type
    /// change does.
    ///
    /// When leaving a scripted type for a non-scripted one, the stored source
    /// is evaluated first and a script failure is returned as an error. A
    /// value the conversion rejects is replaced by this type's default.
    pub fn convert_from(
        &self,
        value: &PropValue,
        from: &PropType,
        evaluator: &dyn ScriptEvaluator,
    ) -> Result<PropValue, ScriptError> {
        let materialized;
        let value = if from.uses_scripted_value() && !self.uses_scripted_value() {
            let source = value.to_string();
            materialized = evaluator.evaluate(&source, &ScriptArgs::new())?;
            &materialized
        } else {
            value
        };

        match self.convert(value, from) {
            Ok(converted) => Ok(converted),
            Err(err) => {
                tracing::debug!(
                    target: targets::BINDER,
                    from = from.name(),
                    to = self.name(),
                    error = %err,
                    "conversion failed, using default value"
                );
                Ok(self.default_value())
            }
        }
    }
}

/// Types compare by kind; custom types compare by name.
impl PartialEq for PropType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::String, Self::String)
            | (Self::ScriptedValue, Self::ScriptedValue)
            | (Self::Script, Self::Script) => true,
            (Self::Custom(a), Self::Custom(b)) => a.name == b.name,
            _ => false,
        }
    }
}

impl fmt::Display for PropType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The set of prop types a host offers, looked up by name.
#[derive(Debug, Clone)]
pub struct PropTypeRegistry {
    types: Vec<PropType>,
}

impl PropTypeRegistry {
    /// Create a registry holding the three built-in types.
    pub fn new() -> Self {
        Self {
            types: vec![PropType::String, PropType::ScriptedValue, PropType::Script],
        }
    }

    /// Register a custom type.
    ///
    /// Fails if any type, built-in or custom, already uses the name.
    pub fn register(&mut self, custom: CustomPropType) -> Result<(), TreeError> {
        if self.get(&custom.name).is_some() {
            return Err(TreeError::DuplicatePropType(custom.name));
        }
        tracing::trace!(target: targets::BINDER, name = %custom.name, "registered prop type");
        self.types.push(PropType::Custom(custom));
        Ok(())
    }

    /// Look up a type by name.
    pub fn get(&self, name: &str) -> Option<&PropType> {
        self.types.iter().find(|t| t.name() == name)
    }

    /// Iterate over all types in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &PropType> {
        self.types.iter()
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Always false; the built-ins are always present.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Default for PropTypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
