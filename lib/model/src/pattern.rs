use crate::PatternTerm;
use oxrdf::Variable;
use std::fmt::{Display, Formatter};
use std::slice::Iter;

/// A triple whose positions may be variables.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TriplePattern {
    pub subject: PatternTerm,
    pub predicate: PatternTerm,
    pub object: PatternTerm,
}

impl TriplePattern {
    pub fn new(
        subject: impl Into<PatternTerm>,
        predicate: impl Into<PatternTerm>,
        object: impl Into<PatternTerm>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }

    /// Iterates over subject, predicate and object in this order.
    pub fn terms(&self) -> impl Iterator<Item = &PatternTerm> {
        [&self.subject, &self.predicate, &self.object].into_iter()
    }
}

impl Display for TriplePattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
    }
}

/// An ordered group of triple patterns that is fetched from the knowledge network as a whole.
///
/// Duplicated triples are kept. They only increase the size of the pattern that is sent to the
/// network, as materializing a duplicated triple inserts the same fact twice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PatternGroup {
    triples: Vec<TriplePattern>,
}

impl PatternGroup {
    pub fn new(triples: Vec<TriplePattern>) -> Self {
        Self { triples }
    }

    pub fn push(&mut self, triple: TriplePattern) {
        self.triples.push(triple);
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn iter(&self) -> Iter<'_, TriplePattern> {
        self.triples.iter()
    }

    pub fn triples(&self) -> &[TriplePattern] {
        &self.triples
    }

    /// Returns the distinct variables of this group in order of their first occurrence.
    pub fn variables(&self) -> Vec<&Variable> {
        let mut result: Vec<&Variable> = Vec::new();
        for variable in self.triples.iter().flat_map(TriplePattern::terms) {
            if let Some(variable) = variable.as_variable() {
                if !result.contains(&variable) {
                    result.push(variable);
                }
            }
        }
        result
    }

    /// Returns true if `name` is a variable of this group.
    pub fn contains_variable(&self, name: &str) -> bool {
        self.variables().iter().any(|v| v.as_str() == name)
    }
}

/// The canonical textual form of the group: each triple terminated by ` .`, triples separated by
/// a single space.
///
/// This text is used when registering an interaction at the knowledge network and as the label
/// of a [KnowledgeGap](crate::KnowledgeGap).
impl Display for PatternGroup {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (i, triple) in self.triples.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            triple.fmt(f)?;
        }
        Ok(())
    }
}

impl From<Vec<TriplePattern>> for PatternGroup {
    fn from(value: Vec<TriplePattern>) -> Self {
        Self::new(value)
    }
}

impl FromIterator<TriplePattern> for PatternGroup {
    fn from_iter<T: IntoIterator<Item = TriplePattern>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl Extend<TriplePattern> for PatternGroup {
    fn extend<T: IntoIterator<Item = TriplePattern>>(&mut self, iter: T) {
        self.triples.extend(iter);
    }
}

impl<'a> IntoIterator for &'a PatternGroup {
    type Item = &'a TriplePattern;
    type IntoIter = Iter<'a, TriplePattern>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxrdf::{NamedNode, Variable};

    fn var(name: &str) -> PatternTerm {
        Variable::new_unchecked(name).into()
    }

    fn iri(iri: &str) -> PatternTerm {
        NamedNode::new_unchecked(iri).into()
    }

    #[test]
    fn canonical_text_of_single_triple() {
        let group = PatternGroup::new(vec![TriplePattern::new(
            var("e"),
            iri("http://example.org/occurredAt"),
            var("d"),
        )]);

        assert_eq!(group.to_string(), "?e <http://example.org/occurredAt> ?d .");
    }

    #[test]
    fn canonical_text_separates_triples_by_space() {
        let group = PatternGroup::new(vec![
            TriplePattern::new(var("e"), iri("http://example.org/occurredAt"), var("d")),
            TriplePattern::new(
                var("e"),
                iri("http://www.w3.org/1999/02/22-rdf-syntax-ns#type"),
                iri("http://example.org/Event"),
            ),
        ]);

        assert_eq!(
            group.to_string(),
            "?e <http://example.org/occurredAt> ?d . ?e <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://example.org/Event> ."
        );
    }

    #[test]
    fn variables_are_distinct_and_ordered() {
        let group = PatternGroup::new(vec![
            TriplePattern::new(var("e"), iri("http://example.org/p"), var("d")),
            TriplePattern::new(var("d"), var("p"), var("e")),
        ]);

        let variables = group
            .variables()
            .into_iter()
            .map(|v| v.as_str().to_owned())
            .collect::<Vec<_>>();
        assert_eq!(variables, vec!["e", "d", "p"]);
    }

    #[test]
    fn empty_group_renders_empty_text() {
        assert_eq!(PatternGroup::default().to_string(), "");
    }
}
