use crate::error::FederationError;
use crate::federation::network::KnowledgeNetwork;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};
use tracing::{info, warn};

/// Keeps track of the knowledge base that represents each requester at the knowledge network.
///
/// A knowledge base is registered lazily on the first request of a requester and stays
/// registered until [KnowledgeBaseRegistry::close_all] is called.
pub struct KnowledgeBaseRegistry {
    network: Arc<dyn KnowledgeNetwork>,
    id_prefix: String,
    /// Requester id to knowledge base id. The cell of a requester is initialized at most once,
    /// the map lock is never held while talking to the network.
    knowledge_bases: Mutex<HashMap<String, Arc<OnceCell<String>>>>,
}

impl KnowledgeBaseRegistry {
    pub fn open(network: Arc<dyn KnowledgeNetwork>, id_prefix: impl Into<String>) -> Self {
        Self {
            network,
            id_prefix: id_prefix.into(),
            knowledge_bases: Mutex::new(HashMap::new()),
        }
    }

    pub fn knowledge_base_id(&self, requester_id: &str) -> String {
        format!("{}{requester_id}", self.id_prefix)
    }

    /// Returns the id of the knowledge base of `requester_id`, registering it if necessary.
    ///
    /// Concurrent calls for the same requester wait for a single registration. If the
    /// registration fails, the next call tries again.
    pub async fn get_or_create(&self, requester_id: &str) -> Result<String, FederationError> {
        let cell = {
            let mut knowledge_bases = self.knowledge_bases.lock().await;
            Arc::clone(knowledge_bases.entry(requester_id.to_owned()).or_default())
        };

        let id = cell
            .get_or_try_init(|| async move {
                let id = self.knowledge_base_id(requester_id);
                let name = format!("SPARQL endpoint {id}");
                self.network.register_knowledge_base(&id, &name).await?;
                info!("Registered knowledge base {id} for requester '{requester_id}'");
                Ok::<_, FederationError>(id)
            })
            .await?;
        Ok(id.clone())
    }

    /// Unregisters every knowledge base registered so far.
    ///
    /// Failures are logged and do not stop the removal of the remaining knowledge bases.
    pub async fn close_all(&self) {
        let knowledge_bases = std::mem::take(&mut *self.knowledge_bases.lock().await);
        let registered = knowledge_bases
            .into_iter()
            .filter_map(|(requester_id, cell)| Some((requester_id, cell.get()?.clone())))
            .collect::<Vec<_>>();
        info!("Unregistering {} knowledge bases", registered.len());
        for (requester_id, id) in registered {
            if let Err(error) = self.network.unregister_knowledge_base(&id).await {
                warn!("Could not unregister knowledge base {id} of '{requester_id}': {error}");
            }
        }
    }

    /// The number of requesters whose knowledge base is registered.
    pub async fn registered_count(&self) -> usize {
        self.knowledge_bases
            .lock()
            .await
            .values()
            .filter(|cell| cell.initialized())
            .count()
    }
}
