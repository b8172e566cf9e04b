use crate::auth::TokenRegistry;
use sparql_mediator_engine::Mediator;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub mediator: Arc<Mediator>,
    pub tokens: Arc<TokenRegistry>,
}

impl AppState {
    pub fn new(mediator: Arc<Mediator>, tokens: TokenRegistry) -> Self {
        Self {
            mediator,
            tokens: Arc::new(tokens),
        }
    }
}
