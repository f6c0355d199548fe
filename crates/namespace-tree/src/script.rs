//! Pluggable script evaluation.
//!
//! Scripted values and script binders store source text. The tree never
//! interprets that text itself; it hands it to a [`ScriptEvaluator`]
//! supplied by the host. An evaluator runs the source in an isolated
//! environment, looks up the callable named [`SCRIPT_ENTRY_POINT`], calls it
//! with the [`ScriptArgs`] and returns the result. Any failure along the way
//! (compilation, a missing entry point, a runtime error) is reported as a
//! single [`ScriptError`].
//!
//! Evaluation is synchronous and unbounded: a script that never returns
//! blocks the caller.
//!
//! # Example
//!
//! ```
//! use namespace_tree::{PropValue, ScriptArgs, ScriptError, ScriptEvaluator};
//!
//! // Closures are evaluators.
//! let echo = |source: &str, _args: &ScriptArgs| -> Result<PropValue, ScriptError> {
//!     Ok(PropValue::from(source))
//! };
//! let value = echo.evaluate("hello", &ScriptArgs::new()).unwrap();
//! assert_eq!(value, PropValue::from("hello"));
//! ```

use std::collections::BTreeMap;

use crate::error::ScriptError;
use crate::value::PropValue;

/// Name of the callable every script source must define.
pub const SCRIPT_ENTRY_POINT: &str = "script";

/// Arguments passed to a script's entry point.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScriptArgs {
    /// Positional arguments, in call order.
    pub positional: Vec<PropValue>,
    /// Keyword arguments.
    pub keyword: BTreeMap<String, PropValue>,
}

impl ScriptArgs {
    /// Create an empty argument list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional argument.
    pub fn arg(mut self, value: impl Into<PropValue>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Set a keyword argument.
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.keyword.insert(name.into(), value.into());
        self
    }

    /// Returns true if there are no arguments at all.
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keyword.is_empty()
    }
}

/// Executes script source on behalf of the binding engine.
pub trait ScriptEvaluator {
    /// Run `source`, invoke its entry point with `args` and return the result.
    fn evaluate(&self, source: &str, args: &ScriptArgs) -> Result<PropValue, ScriptError>;
}

impl<F> ScriptEvaluator for F
where
    F: Fn(&str, &ScriptArgs) -> Result<PropValue, ScriptError>,
{
    fn evaluate(&self, source: &str, args: &ScriptArgs) -> Result<PropValue, ScriptError> {
        self(source, args)
    }
}

/// An evaluator for hosts without a scripting runtime.
///
/// Every evaluation fails, so scripted values surface as script failures
/// instead of being silently skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoScripting;

impl ScriptEvaluator for NoScripting {
    fn evaluate(&self, _source: &str, _args: &ScriptArgs) -> Result<PropValue, ScriptError> {
        Err(ScriptError::new("scripting is not available"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_builder() {
        let args = ScriptArgs::new().arg(1).arg("two").kwarg("three", 3);
        assert_eq!(args.positional, vec![PropValue::from(1), PropValue::from("two")]);
        assert_eq!(args.keyword.get("three"), Some(&PropValue::from(3)));
        assert!(!args.is_empty());
        assert!(ScriptArgs::new().is_empty());
    }

    #[test]
    fn test_closure_evaluator() {
        let count_args = |_: &str, args: &ScriptArgs| -> Result<PropValue, ScriptError> {
            Ok(PropValue::from(args.positional.len() as i64))
        };
        let result = count_args.evaluate("ignored", &ScriptArgs::new().arg(1).arg(2));
        assert_eq!(result, Ok(PropValue::from(2)));
    }

    #[test]
    fn test_no_scripting_fails() {
        let result = NoScripting.evaluate("anything", &ScriptArgs::new());
        assert!(result.is_err());
    }
}
