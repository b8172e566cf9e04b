use crate::auth::TokenRegistry;
use sparql_mediator_engine::Mediator;
use std::sync::Arc;

pub const MAX_SPARQL_BODY_SIZE: usize = 1024 * 1024 * 128; // 128MB

/// Holds the configuration for a SPARQL mediator web server.
pub struct ServerConfig {
    /// The mediator that answers the requests.
    pub mediator: Arc<Mediator>,
    /// Maps the tokens of incoming requests to requesters.
    pub tokens: TokenRegistry,
    /// The IP address or DNS name that the socket binds to.
    pub bind: String,
    /// Whether CORS is enabled.
    pub cors: bool,
    /// The name under which the endpoint presents itself.
    pub endpoint_name: String,
}
