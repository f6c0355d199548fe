//! Tree configuration.

/// Default separator between a suggested name and its numeric suffix.
pub const DEFAULT_SUFFIX_SEPARATOR: &str = "_";

/// Default width of the zero-padded numeric suffix.
pub const DEFAULT_SUFFIX_WIDTH: usize = 8;

/// Naming policy for a [`NamespaceTree`](crate::NamespaceTree).
///
/// Controls how [`suggest_child_name`](crate::NamespaceTree::suggest_child_name)
/// disambiguates a taken name: `prefix` + `suffix_separator` + a counter
/// zero-padded to `suffix_width` digits, e.g. `clip_00000000`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeConfig {
    /// Text placed between the prefix and the counter.
    pub suffix_separator: String,
    /// Minimum number of digits in the counter.
    pub suffix_width: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            suffix_separator: DEFAULT_SUFFIX_SEPARATOR.to_string(),
            suffix_width: DEFAULT_SUFFIX_WIDTH,
        }
    }
}

impl TreeConfig {
    /// Set the suffix separator.
    pub fn with_suffix_separator(mut self, separator: impl Into<String>) -> Self {
        self.suffix_separator = separator.into();
        self
    }

    /// Set the counter width.
    pub fn with_suffix_width(mut self, width: usize) -> Self {
        self.suffix_width = width;
        self
    }

    /// Format the candidate name for the given counter value.
    pub(crate) fn suffixed_name(&self, prefix: &str, counter: u64) -> String {
        format!(
            "{prefix}{sep}{counter:0width$}",
            sep = self.suffix_separator,
            width = self.suffix_width
        )
    }
}
