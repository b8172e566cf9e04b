use crate::{PatternGroup, ValuesClause};
use std::fmt::{Display, Formatter};

/// The fetchable parts of a SPARQL request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestDecomposition {
    /// The triples that must hold for every solution.
    pub main_pattern: PatternGroup,
    /// One group per `OPTIONAL` block.
    pub optional_patterns: Vec<PatternGroup>,
    /// One clause per `VALUES` block, or a single clause after resolution.
    pub values_clauses: Vec<ValuesClause>,
    /// The template of an `INSERT` clause. Empty for queries.
    pub insert_pattern: PatternGroup,
}

impl RequestDecomposition {
    pub fn new() -> Self {
        Self::default()
    }
}

/// A multi-line summary that is meant for logging.
impl Display for RequestDecomposition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "main: {}", self.main_pattern)?;
        for pattern in &self.optional_patterns {
            writeln!(f, "optional: {pattern}")?;
        }
        for clause in &self.values_clauses {
            let rows = clause
                .iter()
                .map(|row| {
                    let entries = row
                        .iter()
                        .map(|(variable, value)| format!("?{variable}={value}"))
                        .collect::<Vec<_>>();
                    format!("({})", entries.join(", "))
                })
                .collect::<Vec<_>>();
            writeln!(f, "values: {}", rows.join(" OR "))?;
        }
        if !self.insert_pattern.is_empty() {
            writeln!(f, "insert: {}", self.insert_pattern)?;
        }
        Ok(())
    }
}
