use crate::error::FederationError;
use crate::federation::network::{
    AskResponse, InteractionId, InteractionKind, InteractionRegistration, KnowledgeNetwork,
    PostResponse,
};
use async_trait::async_trait;
use sparql_mediator_model::BindingRow;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A call that reached an [InMemoryKnowledgeNetwork].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub knowledge_base_id: String,
    /// The canonical text of the pattern of the interaction.
    pub pattern: String,
    pub bindings: Vec<BindingRow>,
}

#[derive(Default)]
struct State {
    knowledge_bases: Vec<String>,
    interactions: HashMap<InteractionId, InteractionRegistration>,
    registrations: Vec<InteractionRegistration>,
    asks: Vec<RecordedCall>,
    posts: Vec<RecordedCall>,
    next_id: usize,
}

/// A [KnowledgeNetwork] that answers asks with prepared responses and records every call.
///
/// Asks for a pattern without a prepared response are answered with an empty binding set, and
/// with an empty list of knowledge gaps if the interaction has knowledge gaps enabled.
#[derive(Default)]
pub struct InMemoryKnowledgeNetwork {
    responses: HashMap<String, AskResponse>,
    state: Mutex<State>,
}

impl InMemoryKnowledgeNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers asks for the pattern with the canonical text `pattern` with `response`.
    #[must_use]
    pub fn respond_to(mut self, pattern: impl Into<String>, response: AskResponse) -> Self {
        self.responses.insert(pattern.into(), response);
        self
    }

    /// The ids of the currently registered knowledge bases.
    pub fn knowledge_bases(&self) -> Vec<String> {
        self.state().knowledge_bases.clone()
    }

    /// All interactions that were ever registered, in order of registration.
    pub fn registrations(&self) -> Vec<InteractionRegistration> {
        self.state().registrations.clone()
    }

    /// The number of interactions that are registered and not yet unregistered.
    pub fn active_interactions(&self) -> usize {
        self.state().interactions.len()
    }

    pub fn asks(&self) -> Vec<RecordedCall> {
        self.state().asks.clone()
    }

    pub fn posts(&self) -> Vec<RecordedCall> {
        self.state().posts.clone()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn interaction(
        &self,
        interaction_id: &InteractionId,
        kind: InteractionKind,
    ) -> Result<InteractionRegistration, FederationError> {
        match self.state().interactions.get(interaction_id) {
            Some(registration) if registration.kind == kind => Ok(registration.clone()),
            _ => Err(FederationError::Rejected {
                status: 404,
                message: format!("Unknown {kind:?} interaction {interaction_id}"),
            }),
        }
    }
}

#[async_trait]
impl KnowledgeNetwork for InMemoryKnowledgeNetwork {
    async fn register_knowledge_base(
        &self,
        knowledge_base_id: &str,
        _name: &str,
    ) -> Result<(), FederationError> {
        let mut state = self.state();
        if state.knowledge_bases.iter().any(|id| id == knowledge_base_id) {
            return Err(FederationError::Rejected {
                status: 400,
                message: format!("Knowledge base {knowledge_base_id} already exists"),
            });
        }
        state.knowledge_bases.push(knowledge_base_id.to_owned());
        Ok(())
    }

    async fn unregister_knowledge_base(
        &self,
        knowledge_base_id: &str,
    ) -> Result<(), FederationError> {
        self.state()
            .knowledge_bases
            .retain(|id| id != knowledge_base_id);
        Ok(())
    }

    async fn register_interaction(
        &self,
        _knowledge_base_id: &str,
        registration: &InteractionRegistration,
    ) -> Result<InteractionId, FederationError> {
        let mut state = self.state();
        state.next_id += 1;
        let id = InteractionId::new(format!("ki-{}", state.next_id));
        state.interactions.insert(id.clone(), registration.clone());
        state.registrations.push(registration.clone());
        Ok(id)
    }

    async fn unregister_interaction(
        &self,
        _knowledge_base_id: &str,
        interaction_id: &InteractionId,
    ) -> Result<(), FederationError> {
        self.state().interactions.remove(interaction_id);
        Ok(())
    }

    async fn ask(
        &self,
        knowledge_base_id: &str,
        interaction_id: &InteractionId,
        bindings: &[BindingRow],
    ) -> Result<AskResponse, FederationError> {
        let registration = self.interaction(interaction_id, InteractionKind::Ask)?;
        self.state().asks.push(RecordedCall {
            knowledge_base_id: knowledge_base_id.to_owned(),
            pattern: registration.pattern.clone(),
            bindings: bindings.to_vec(),
        });

        let mut response = self
            .responses
            .get(&registration.pattern)
            .cloned()
            .unwrap_or_default();
        if registration.knowledge_gaps_enabled && response.knowledge_gaps.is_none() {
            response.knowledge_gaps = Some(Vec::new());
        }
        if !registration.knowledge_gaps_enabled {
            response.knowledge_gaps = None;
        }
        Ok(response)
    }

    async fn post(
        &self,
        knowledge_base_id: &str,
        interaction_id: &InteractionId,
        bindings: &[BindingRow],
    ) -> Result<PostResponse, FederationError> {
        let registration = self.interaction(interaction_id, InteractionKind::Post)?;
        self.state().posts.push(RecordedCall {
            knowledge_base_id: knowledge_base_id.to_owned(),
            pattern: registration.pattern,
            bindings: bindings.to_vec(),
        });
        Ok(PostResponse::default())
    }
}
