use oxigraph::sparql::EvaluationError;
use oxigraph::store::StorageError;
use spargebra::SparqlSyntaxError;
use sparql_mediator_model::Term;

/// An error raised while handling a SPARQL request.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum MediatorError {
    /// The request is not valid SPARQL.
    #[error(transparent)]
    Parse(#[from] SparqlSyntaxError),
    /// The request is valid SPARQL but of a form the mediator does not answer.
    #[error("Unsupported request type: {0}")]
    UnsupportedRequestType(String),
    /// The request contains a construct that cannot be decomposed into fetchable patterns.
    #[error("Unsupported construct type {0}. Please contact the endpoint administrator to implement this!")]
    UnsupportedConstruct(String),
    /// Fetching facts from or publishing facts to the knowledge network failed.
    #[error("An error occurred when contacting the knowledge network: {0}")]
    Federation(#[from] FederationError),
    /// The query could not be evaluated on the materialized graph.
    #[error("Query could not be executed on the local graph: {0}")]
    Evaluation(#[from] LocalEvaluationError),
}

impl MediatorError {
    pub fn unsupported_construct(construct: impl Into<String>) -> Self {
        Self::UnsupportedConstruct(construct.into())
    }

    pub fn unsupported_request_type(request_type: impl Into<String>) -> Self {
        Self::UnsupportedRequestType(request_type.into())
    }

    /// Returns true if the error is caused by the request rather than by the mediator or one of
    /// its collaborators.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Parse(_) | Self::UnsupportedRequestType(_) | Self::UnsupportedConstruct(_)
        )
    }
}

/// An error raised while talking to the knowledge network.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum FederationError {
    /// The knowledge network could not be reached.
    #[error("The knowledge network could not be reached: {0}")]
    Transport(#[from] reqwest::Error),
    /// The knowledge network answered with a non-success status.
    #[error("The knowledge network responded with status {status}: {message}")]
    Rejected { status: u16, message: String },
    /// The knowledge network answered, but the answer violates the interaction contract.
    #[error("The knowledge network violated the interaction protocol: {0}")]
    Protocol(String),
    /// A returned binding does not fit the pattern it was returned for.
    #[error(transparent)]
    BindingMismatch(#[from] BindingMismatchError),
}

impl FederationError {
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }

    /// Returns true if the network was not reachable or refused the request.
    pub fn is_transport_error(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Rejected { .. })
    }
}

/// A binding row that cannot be substituted into a pattern.
#[derive(Debug, thiserror::Error)]
pub enum BindingMismatchError {
    /// The row does not bind a variable that the pattern uses.
    #[error("The binding does not contain a value for variable ?{0}")]
    UnboundVariable(String),
    /// The bound value is not allowed in the position of the variable.
    #[error("The value {value} bound to ?{variable} is not a valid {position}")]
    InvalidPosition {
        variable: String,
        value: Term,
        position: &'static str,
    },
    /// A constant of the pattern is not allowed in its position.
    #[error("The pattern contains {value} which is not a valid {position}")]
    InvalidConstant { value: String, position: &'static str },
}

/// An error raised by the evaluator over the materialized graph.
#[derive(Debug, thiserror::Error)]
pub enum LocalEvaluationError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
    #[error("The query does not return solutions")]
    NotSolutions,
}
