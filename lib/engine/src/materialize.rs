use crate::error::BindingMismatchError;
use sparql_mediator_model::{
    BindingRow, Graph, NamedNode, PatternGroup, PatternTerm, Subject, Term, Triple,
};

/// Inserts one concrete triple per triple pattern and binding row into `graph`.
///
/// Returns the number of triples that were not yet part of the graph.
pub fn materialize(
    graph: &mut Graph,
    pattern: &PatternGroup,
    bindings: &[BindingRow],
) -> Result<usize, BindingMismatchError> {
    let mut inserted = 0;
    for row in bindings {
        for triple in pattern {
            let triple = Triple::new(
                subject(&triple.subject, row)?,
                predicate(&triple.predicate, row)?,
                resolve(&triple.object, row)?,
            );
            if graph.insert(&triple) {
                inserted += 1;
            }
        }
    }
    Ok(inserted)
}

fn resolve(term: &PatternTerm, row: &BindingRow) -> Result<Term, BindingMismatchError> {
    match term {
        PatternTerm::Variable(variable) => row
            .get(variable.as_str())
            .cloned()
            .ok_or_else(|| BindingMismatchError::UnboundVariable(variable.as_str().to_owned())),
        PatternTerm::NamedNode(node) => Ok(node.clone().into()),
        PatternTerm::Literal(literal) => Ok(literal.clone().into()),
    }
}

fn subject(term: &PatternTerm, row: &BindingRow) -> Result<Subject, BindingMismatchError> {
    match resolve(term, row)? {
        Term::NamedNode(node) => Ok(node.into()),
        Term::BlankNode(node) => Ok(node.into()),
        Term::Triple(triple) => Ok(Subject::Triple(triple)),
        value @ Term::Literal(_) => Err(mismatch(term, value, "subject")),
    }
}

fn predicate(term: &PatternTerm, row: &BindingRow) -> Result<NamedNode, BindingMismatchError> {
    match resolve(term, row)? {
        Term::NamedNode(node) => Ok(node),
        value => Err(mismatch(term, value, "predicate")),
    }
}

fn mismatch(term: &PatternTerm, value: Term, position: &'static str) -> BindingMismatchError {
    match term {
        PatternTerm::Variable(variable) => BindingMismatchError::InvalidPosition {
            variable: variable.as_str().to_owned(),
            value,
            position,
        },
        PatternTerm::NamedNode(_) | PatternTerm::Literal(_) => {
            BindingMismatchError::InvalidConstant {
                value: value.to_string(),
                position,
            }
        }
    }
}
