use crate::PatternGroup;
use oxrdf::Term;
use serde::de::{Error as _, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::btree_map::{self, BTreeMap};
use std::fmt::Formatter;
use std::str::FromStr;

/// A set of rows, one [ValuesClause] per `VALUES` block of a request.
pub type ValuesClause = Vec<BindingRow>;

/// A mapping from variable names to concrete terms.
///
/// A variable that is not part of the row is unbound in this row. On the wire, a row is a JSON
/// object whose values are terms in N-Triples syntax, which is the binding format of the
/// knowledge network.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BindingRow {
    values: BTreeMap<String, Term>,
}

impl BindingRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, variable: &str) -> Option<&Term> {
        self.values.get(variable)
    }

    pub fn insert(&mut self, variable: impl Into<String>, value: impl Into<Term>) -> Option<Term> {
        self.values.insert(variable.into(), value.into())
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Term> {
        self.values.iter()
    }

    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Merges two rows into one.
    ///
    /// Returns [None] if both rows bind the same variable to different values.
    pub fn merge(&self, other: &BindingRow) -> Option<BindingRow> {
        let mut result = self.clone();
        for (variable, value) in &other.values {
            match result.values.get(variable) {
                Some(existing) if existing != value => return None,
                Some(_) => {}
                None => {
                    result.values.insert(variable.clone(), value.clone());
                }
            }
        }
        Some(result)
    }

    /// Returns a copy of this row that only retains the variables of `pattern`.
    #[must_use]
    pub fn restrict_to(&self, pattern: &PatternGroup) -> BindingRow {
        self.values
            .iter()
            .filter(|(variable, _)| pattern.contains_variable(variable))
            .map(|(variable, value)| (variable.clone(), value.clone()))
            .collect()
    }
}

impl FromIterator<(String, Term)> for BindingRow {
    fn from_iter<T: IntoIterator<Item = (String, Term)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a BindingRow {
    type Item = (&'a String, &'a Term);
    type IntoIter = btree_map::Iter<'a, String, Term>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Serialize for BindingRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (variable, value) in &self.values {
            map.serialize_entry(variable, &value.to_string())?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for BindingRow {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(BindingRowVisitor)
    }
}

struct BindingRowVisitor;

impl<'de> Visitor<'de> for BindingRowVisitor {
    type Value = BindingRow;

    fn expecting(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str("a map from variable names to N-Triples terms")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut row = BindingRow::new();
        while let Some((variable, value)) = access.next_entry::<String, String>()? {
            let term = Term::from_str(&value).map_err(|e| {
                A::Error::custom(format!(
                    "Invalid value '{value}' for variable '{variable}': {e}"
                ))
            })?;
            row.values.insert(variable, term);
        }
        Ok(row)
    }
}
