//! Answers SPARQL requests with facts from a knowledge network.
//!
//! A request is decomposed into the triple patterns that must be fetched ([decompose]), the
//! patterns are asked from the knowledge network ([federation]), the answers are materialized
//! into a local graph ([materialize]) and the original query is evaluated over this graph
//! ([evaluate]). The [Mediator] sequences these steps.

pub mod decompose;
pub mod error;
pub mod evaluate;
pub mod federation;
pub mod materialize;
mod mediator;
pub mod values;

pub use error::{BindingMismatchError, FederationError, LocalEvaluationError, MediatorError};
pub use evaluate::{OxigraphEvaluator, QueryEvaluator, Solutions};
pub use federation::{
    FederationClient, FederationConfig, HttpKnowledgeNetwork, InMemoryKnowledgeNetwork,
    KnowledgeNetwork,
};
pub use mediator::{Mediator, QueryResponse, UpdateOutcome};
