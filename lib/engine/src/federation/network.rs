use crate::error::FederationError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sparql_mediator_model::BindingRow;
use std::fmt::{Display, Formatter};

/// The identifier that the knowledge network assigned to a registered interaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InteractionId(String);

impl InteractionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for InteractionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The kind of an interaction that the mediator registers for a single pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionKind {
    /// Fetches bindings for a graph pattern.
    Ask,
    /// Publishes bindings for an argument graph pattern.
    Post,
}

/// An interaction that is registered at the knowledge network on behalf of a knowledge base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionRegistration {
    pub kind: InteractionKind,
    pub name: String,
    /// The canonical text of the pattern.
    pub pattern: String,
    pub knowledge_gaps_enabled: bool,
}

/// The answer of the knowledge network to an ask.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AskResponse {
    pub binding_set: Vec<BindingRow>,
    /// Only present if the interaction was registered with knowledge gaps enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knowledge_gaps: Option<Vec<Vec<String>>>,
}

/// The answer of the knowledge network to a post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    #[serde(default)]
    pub result_binding_set: Vec<BindingRow>,
}

/// The operations of the knowledge network that are used by the mediator.
///
/// Knowledge bases are identified by the id chosen by the mediator. Interactions are identified by
/// the id returned from [KnowledgeNetwork::register_interaction].
#[async_trait]
pub trait KnowledgeNetwork: Send + Sync {
    async fn register_knowledge_base(
        &self,
        knowledge_base_id: &str,
        name: &str,
    ) -> Result<(), FederationError>;

    async fn unregister_knowledge_base(&self, knowledge_base_id: &str)
        -> Result<(), FederationError>;

    async fn register_interaction(
        &self,
        knowledge_base_id: &str,
        registration: &InteractionRegistration,
    ) -> Result<InteractionId, FederationError>;

    async fn unregister_interaction(
        &self,
        knowledge_base_id: &str,
        interaction_id: &InteractionId,
    ) -> Result<(), FederationError>;

    async fn ask(
        &self,
        knowledge_base_id: &str,
        interaction_id: &InteractionId,
        bindings: &[BindingRow],
    ) -> Result<AskResponse, FederationError>;

    async fn post(
        &self,
        knowledge_base_id: &str,
        interaction_id: &InteractionId,
        bindings: &[BindingRow],
    ) -> Result<PostResponse, FederationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ask_response_with_gaps() {
        let json = r#"{
            "bindingSet": [],
            "knowledgeGaps": [["?e <http://example.org/occurredAt> ?d"]]
        }"#;

        let response: AskResponse = serde_json::from_str(json).unwrap();
        assert!(response.binding_set.is_empty());
        assert_eq!(
            response.knowledge_gaps,
            Some(vec![vec!["?e <http://example.org/occurredAt> ?d".to_owned()]])
        );
    }

    #[test]
    fn ask_response_without_gaps() {
        let json = r#"{"bindingSet": [{"e": "<http://example.org/A>"}]}"#;

        let response: AskResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.binding_set.len(), 1);
        assert_eq!(response.knowledge_gaps, None);
    }
}
