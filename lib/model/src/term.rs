use oxrdf::{Literal, NamedNode, Term, Variable};
use std::fmt::{Display, Formatter};

/// A single position of a [TriplePattern](crate::TriplePattern).
///
/// In contrast to [Term], a pattern term may be a [Variable]. Blank nodes never appear in a
/// pattern; they are turned into variables while the pattern is built.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PatternTerm {
    Variable(Variable),
    NamedNode(NamedNode),
    Literal(Literal),
}

impl PatternTerm {
    /// Returns the variable if this term is one.
    pub fn as_variable(&self) -> Option<&Variable> {
        match self {
            PatternTerm::Variable(variable) => Some(variable),
            PatternTerm::NamedNode(_) | PatternTerm::Literal(_) => None,
        }
    }

    pub fn is_variable(&self) -> bool {
        self.as_variable().is_some()
    }
}

/// Renders the term in the syntax expected by the knowledge network: `?var`, `<iri>`, or an
/// N-Triples literal.
impl Display for PatternTerm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PatternTerm::Variable(variable) => variable.fmt(f),
            PatternTerm::NamedNode(node) => node.fmt(f),
            PatternTerm::Literal(literal) => literal.fmt(f),
        }
    }
}

impl From<Variable> for PatternTerm {
    fn from(value: Variable) -> Self {
        Self::Variable(value)
    }
}

impl From<NamedNode> for PatternTerm {
    fn from(value: NamedNode) -> Self {
        Self::NamedNode(value)
    }
}

impl From<Literal> for PatternTerm {
    fn from(value: Literal) -> Self {
        Self::Literal(value)
    }
}

/// Concrete terms that can be used as a pattern constant.
///
/// Returns [None] for blank nodes and quoted triples as these cannot be expressed in a pattern
/// that is sent to the knowledge network.
impl TryFrom<Term> for PatternTerm {
    type Error = Term;

    fn try_from(value: Term) -> Result<Self, Self::Error> {
        match value {
            Term::NamedNode(node) => Ok(Self::NamedNode(node)),
            Term::Literal(literal) => Ok(Self::Literal(literal)),
            Term::BlankNode(_) | Term::Triple(_) => Err(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxrdf::vocab::xsd;

    #[test]
    fn display_variable() {
        let term = PatternTerm::from(Variable::new_unchecked("event"));
        assert_eq!(term.to_string(), "?event");
    }

    #[test]
    fn display_named_node() {
        let term = PatternTerm::from(NamedNode::new_unchecked("http://example.org/Event"));
        assert_eq!(term.to_string(), "<http://example.org/Event>");
    }

    #[test]
    fn display_typed_literal() {
        let term = PatternTerm::from(Literal::new_typed_literal("2002", xsd::INTEGER));
        assert_eq!(
            term.to_string(),
            "\"2002\"^^<http://www.w3.org/2001/XMLSchema#integer>"
        );
    }

    #[test]
    fn blank_nodes_are_not_pattern_constants() {
        let term = Term::BlankNode(oxrdf::BlankNode::new_unchecked("b0"));
        assert!(PatternTerm::try_from(term).is_err());
    }
}
