//! Fetching bindings from and publishing bindings to the knowledge network.
//!
//! Every pattern is exchanged through an ephemeral interaction: it is registered for exactly one
//! ask or post and unregistered afterwards, regardless of the outcome.

mod http;
mod memory;
mod network;
mod registry;

pub use http::HttpKnowledgeNetwork;
pub use memory::{InMemoryKnowledgeNetwork, RecordedCall};
pub use network::{
    AskResponse, InteractionId, InteractionKind, InteractionRegistration, KnowledgeNetwork,
    PostResponse,
};
pub use registry::KnowledgeBaseRegistry;

use crate::error::FederationError;
use sparql_mediator_model::{BindingRow, KnowledgeGap, PatternGroup};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Configuration of the [FederationClient].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FederationConfig {
    /// Prepended to the requester id to form the id of the requester's knowledge base.
    pub knowledge_base_id_prefix: String,
}

impl FederationConfig {
    pub fn new(knowledge_base_id_prefix: impl Into<String>) -> Self {
        Self {
            knowledge_base_id_prefix: knowledge_base_id_prefix.into(),
        }
    }
}

/// The result of asking a single pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AskOutcome {
    pub binding_set: Vec<BindingRow>,
    /// Present if knowledge gaps were enabled and the network reported at least one.
    pub knowledge_gap: Option<KnowledgeGap>,
}

/// The result of posting a single pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostOutcome {
    pub result_binding_set: Vec<BindingRow>,
}

/// Asks and posts patterns on behalf of requesters.
pub struct FederationClient {
    network: Arc<dyn KnowledgeNetwork>,
    registry: KnowledgeBaseRegistry,
}

impl FederationClient {
    pub fn new(network: Arc<dyn KnowledgeNetwork>, config: FederationConfig) -> Self {
        let registry =
            KnowledgeBaseRegistry::open(Arc::clone(&network), config.knowledge_base_id_prefix);
        Self { network, registry }
    }

    pub fn registry(&self) -> &KnowledgeBaseRegistry {
        &self.registry
    }

    /// Asks the knowledge network for all bindings of `pattern` that are compatible with one of
    /// `bindings`. An empty `bindings` slice is sent as a single empty row.
    pub async fn ask(
        &self,
        requester_id: &str,
        pattern: &PatternGroup,
        bindings: &[BindingRow],
        gaps_enabled: bool,
    ) -> Result<AskOutcome, FederationError> {
        let knowledge_base_id = self.registry.get_or_create(requester_id).await?;
        let registration = InteractionRegistration {
            kind: InteractionKind::Ask,
            name: format!("sparql-query-ask-{}", Uuid::new_v4()),
            pattern: pattern.to_string(),
            knowledge_gaps_enabled: gaps_enabled,
        };
        let interaction_id = self
            .network
            .register_interaction(&knowledge_base_id, &registration)
            .await?;

        let arguments = arguments(bindings);
        info!("Asking pattern: {}", registration.pattern);
        debug!("Bindings that accompany the ask: {arguments:?}");
        let response = self
            .network
            .ask(&knowledge_base_id, &interaction_id, &arguments)
            .await;
        let response = self
            .release(&knowledge_base_id, &interaction_id, response)
            .await?;
        debug!(
            "Knowledge network returned {} bindings",
            response.binding_set.len()
        );

        let knowledge_gap = match (gaps_enabled, response.knowledge_gaps) {
            (false, _) => None,
            (true, None) => {
                return Err(FederationError::protocol(
                    "The knowledge network should support and return knowledge gaps",
                ))
            }
            (true, Some(gaps)) if gaps.is_empty() => None,
            (true, Some(gaps)) => Some(KnowledgeGap::new(registration.pattern, gaps)),
        };

        Ok(AskOutcome {
            binding_set: response.binding_set,
            knowledge_gap,
        })
    }

    /// Publishes `bindings` for the argument pattern `pattern`.
    pub async fn post(
        &self,
        requester_id: &str,
        pattern: &PatternGroup,
        bindings: &[BindingRow],
    ) -> Result<PostOutcome, FederationError> {
        let knowledge_base_id = self.registry.get_or_create(requester_id).await?;
        let registration = InteractionRegistration {
            kind: InteractionKind::Post,
            name: format!("sparql-update-post-{}", Uuid::new_v4()),
            pattern: pattern.to_string(),
            knowledge_gaps_enabled: false,
        };
        let interaction_id = self
            .network
            .register_interaction(&knowledge_base_id, &registration)
            .await?;

        let arguments = arguments(bindings);
        info!("Posting pattern: {}", registration.pattern);
        debug!("Bindings that accompany the post: {arguments:?}");
        let response = self
            .network
            .post(&knowledge_base_id, &interaction_id, &arguments)
            .await;
        let response = self
            .release(&knowledge_base_id, &interaction_id, response)
            .await?;

        Ok(PostOutcome {
            result_binding_set: response.result_binding_set,
        })
    }

    /// Unregisters all knowledge bases of this client.
    pub async fn close(&self) {
        self.registry.close_all().await;
    }

    /// Unregisters an ephemeral interaction once it has been used.
    ///
    /// If the interaction itself failed, that error is returned and a failing unregistration is
    /// only logged.
    async fn release<T>(
        &self,
        knowledge_base_id: &str,
        interaction_id: &InteractionId,
        result: Result<T, FederationError>,
    ) -> Result<T, FederationError> {
        let unregistered = self
            .network
            .unregister_interaction(knowledge_base_id, interaction_id)
            .await;
        match (result, unregistered) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(error)) | (Err(error), Ok(())) => Err(error),
            (Err(error), Err(unregister_error)) => {
                warn!("Could not unregister interaction {interaction_id}: {unregister_error}");
                Err(error)
            }
        }
    }
}

fn arguments(bindings: &[BindingRow]) -> Vec<BindingRow> {
    if bindings.is_empty() {
        vec![BindingRow::new()]
    } else {
        bindings.to_vec()
    }
}
