use crate::error::FederationError;
use crate::federation::network::{
    AskResponse, InteractionId, InteractionKind, InteractionRegistration, KnowledgeNetwork,
    PostResponse,
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sparql_mediator_model::BindingRow;
use std::time::Duration;
use tracing::debug;

const KNOWLEDGE_BASE_ID_HEADER: &str = "Knowledge-Base-Id";
const KNOWLEDGE_INTERACTION_ID_HEADER: &str = "Knowledge-Interaction-Id";

/// A [KnowledgeNetwork] that talks to the REST API of a knowledge engine smart connector.
#[derive(Debug, Clone)]
pub struct HttpKnowledgeNetwork {
    client: Client,
    base_url: String,
}

impl HttpKnowledgeNetwork {
    /// Creates a client for the knowledge engine at `base_url`. Each call to the network fails
    /// with a transport error if it does not finish within `timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FederationError> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct KnowledgeBaseRegistrationRequest<'a> {
    knowledge_base_id: &'a str,
    knowledge_base_name: &'a str,
    knowledge_base_description: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InteractionRegistrationRequest<'a> {
    knowledge_interaction_type: &'static str,
    knowledge_interaction_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    graph_pattern: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    argument_graph_pattern: Option<&'a str>,
    knowledge_gaps_enabled: bool,
}

impl<'a> From<&'a InteractionRegistration> for InteractionRegistrationRequest<'a> {
    fn from(registration: &'a InteractionRegistration) -> Self {
        let pattern = Some(registration.pattern.as_str());
        match registration.kind {
            InteractionKind::Ask => Self {
                knowledge_interaction_type: "AskKnowledgeInteraction",
                knowledge_interaction_name: &registration.name,
                graph_pattern: pattern,
                argument_graph_pattern: None,
                knowledge_gaps_enabled: registration.knowledge_gaps_enabled,
            },
            InteractionKind::Post => Self {
                knowledge_interaction_type: "PostKnowledgeInteraction",
                knowledge_interaction_name: &registration.name,
                graph_pattern: None,
                argument_graph_pattern: pattern,
                knowledge_gaps_enabled: registration.knowledge_gaps_enabled,
            },
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InteractionRegistrationResponse {
    knowledge_interaction_id: InteractionId,
}

#[async_trait]
impl KnowledgeNetwork for HttpKnowledgeNetwork {
    async fn register_knowledge_base(
        &self,
        knowledge_base_id: &str,
        name: &str,
    ) -> Result<(), FederationError> {
        let request = self
            .client
            .post(self.url("/sc"))
            .json(&KnowledgeBaseRegistrationRequest {
                knowledge_base_id,
                knowledge_base_name: name,
                knowledge_base_description: "",
            });
        send(request).await?;
        Ok(())
    }

    async fn unregister_knowledge_base(
        &self,
        knowledge_base_id: &str,
    ) -> Result<(), FederationError> {
        let request = self
            .client
            .delete(self.url("/sc"))
            .header(KNOWLEDGE_BASE_ID_HEADER, knowledge_base_id);
        send(request).await?;
        Ok(())
    }

    async fn register_interaction(
        &self,
        knowledge_base_id: &str,
        registration: &InteractionRegistration,
    ) -> Result<InteractionId, FederationError> {
        let request = self
            .client
            .post(self.url("/sc/ki"))
            .header(KNOWLEDGE_BASE_ID_HEADER, knowledge_base_id)
            .json(&InteractionRegistrationRequest::from(registration));
        let response: InteractionRegistrationResponse = decode(send(request).await?).await?;
        Ok(response.knowledge_interaction_id)
    }

    async fn unregister_interaction(
        &self,
        knowledge_base_id: &str,
        interaction_id: &InteractionId,
    ) -> Result<(), FederationError> {
        let request = self
            .client
            .delete(self.url("/sc/ki"))
            .header(KNOWLEDGE_BASE_ID_HEADER, knowledge_base_id)
            .header(KNOWLEDGE_INTERACTION_ID_HEADER, interaction_id.as_str());
        send(request).await?;
        Ok(())
    }

    async fn ask(
        &self,
        knowledge_base_id: &str,
        interaction_id: &InteractionId,
        bindings: &[BindingRow],
    ) -> Result<AskResponse, FederationError> {
        let request = self
            .client
            .post(self.url("/sc/ask"))
            .header(KNOWLEDGE_BASE_ID_HEADER, knowledge_base_id)
            .header(KNOWLEDGE_INTERACTION_ID_HEADER, interaction_id.as_str())
            .json(bindings);
        decode(send(request).await?).await
    }

    async fn post(
        &self,
        knowledge_base_id: &str,
        interaction_id: &InteractionId,
        bindings: &[BindingRow],
    ) -> Result<PostResponse, FederationError> {
        let request = self
            .client
            .post(self.url("/sc/post"))
            .header(KNOWLEDGE_BASE_ID_HEADER, knowledge_base_id)
            .header(KNOWLEDGE_INTERACTION_ID_HEADER, interaction_id.as_str())
            .json(bindings);
        decode(send(request).await?).await
    }
}

/// Sends the request and turns a non-success status into [FederationError::Rejected].
async fn send(request: RequestBuilder) -> Result<Response, FederationError> {
    let response = request.send().await?;
    let status = response.status();
    debug!("Knowledge network responded to {} with {status}", response.url());

    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(FederationError::Rejected {
            status: status.as_u16(),
            message,
        });
    }
    Ok(response)
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, FederationError> {
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| {
        FederationError::protocol(format!("Unexpected response of the knowledge network: {e}"))
    })
}
