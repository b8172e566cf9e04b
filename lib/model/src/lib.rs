//! The pattern model shared by the decomposition and federation components of the mediator.
//!
//! Patterns are kept independent of the SPARQL algebra: a [PatternGroup] is what is sent to the
//! knowledge network, a [BindingRow] is what comes back.

mod binding;
mod decomposition;
mod gap;
mod pattern;
mod term;

pub use binding::*;
pub use decomposition::*;
pub use gap::*;
pub use pattern::*;
pub use term::*;

// Re-export some oxrdf types.
pub use oxrdf::{
    BlankNode, Graph, GraphNameRef, Literal, LiteralRef, NamedNode, NamedNodeRef, Subject, Term,
    TermParseError, Triple, TripleRef, Variable, VariableRef,
};

/// Well-known vocabularies.
pub mod vocab {
    pub use oxrdf::vocab::{rdf, xsd};
}
