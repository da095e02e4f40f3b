//! Named update policies.
//!
//! Each presenter declares how it treats partial or absent data instead of
//! encoding the rule implicitly in its handler.

/// How a presenter applies a record that only carries part of the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePolicy {
    /// An absent path means "no update this tick". Nothing is written and
    /// no default is substituted.
    SkipAbsent,
    /// The value at the index level replaces whatever was there, wholesale.
    /// Siblings untouched by the record keep their previous values.
    OverwriteLeaf,
}

impl MergePolicy {
    /// Short label for the status bar
    pub fn label(&self) -> &'static str {
        match self {
            MergePolicy::SkipAbsent => "skip-absent",
            MergePolicy::OverwriteLeaf => "overwrite-leaf",
        }
    }
}
