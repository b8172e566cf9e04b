use serde::{Deserialize, Serialize};

/// A pattern for which the knowledge network found no bindings, together with the alternative
/// sets of fact patterns that would make it answerable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeGap {
    /// The canonical text of the pattern that could not be answered.
    pub pattern: String,
    /// Each entry is one set of triple patterns that, once known, resolves the gap.
    pub gaps: Vec<Vec<String>>,
}

impl KnowledgeGap {
    pub fn new(pattern: impl Into<String>, gaps: Vec<Vec<String>>) -> Self {
        Self {
            pattern: pattern.into(),
            gaps,
        }
    }
}
