use crate::decompose::{decompose_query, decompose_update};
use crate::error::{FederationError, MediatorError};
use crate::evaluate::{OxigraphEvaluator, QueryEvaluator};
use crate::federation::{
    AskOutcome, FederationClient, FederationConfig, KnowledgeNetwork, PostOutcome,
};
use crate::materialize::materialize;
use crate::values::resolve_values;
use futures::future::join_all;
use itertools::Itertools;
use spargebra::{Query, Update};
use sparql_mediator_model::{
    BindingRow, Graph, KnowledgeGap, PatternGroup, RequestDecomposition, Variable,
};
use std::sync::Arc;
use tracing::{debug, info};

/// The answer to a SELECT query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResponse {
    pub variables: Vec<Variable>,
    pub rows: Vec<BindingRow>,
    /// Only present if knowledge gaps were requested.
    pub knowledge_gaps: Option<Vec<KnowledgeGap>>,
}

/// What an update published to the knowledge network.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// The rows that were posted for the insert pattern. Nothing was posted if empty.
    pub posted_bindings: Vec<BindingRow>,
    /// The bindings returned by the knowledge network for the post.
    pub result_binding_set: Vec<BindingRow>,
}

impl UpdateOutcome {
    pub fn is_posted(&self) -> bool {
        !self.posted_bindings.is_empty()
    }
}

/// The answers of the knowledge network to the WHERE part of a request.
struct WhereAnswers {
    main: AskOutcome,
    optional: Vec<AskOutcome>,
}

/// Answers SPARQL requests with facts from the knowledge network.
///
/// A query is answered by asking the network for every pattern of the query, materializing the
/// answers into a local graph and evaluating the query over this graph. An update is answered by
/// asking for the patterns of its WHERE clause and posting the insert pattern with the bindings
/// that were found.
pub struct Mediator {
    federation: FederationClient,
    evaluator: Arc<dyn QueryEvaluator>,
}

impl Mediator {
    pub fn new(federation: FederationClient, evaluator: Arc<dyn QueryEvaluator>) -> Self {
        Self {
            federation,
            evaluator,
        }
    }

    /// Creates a mediator for `network` that evaluates queries with [OxigraphEvaluator].
    pub fn with_network(network: Arc<dyn KnowledgeNetwork>, config: FederationConfig) -> Self {
        Self::new(
            FederationClient::new(network, config),
            Arc::new(OxigraphEvaluator),
        )
    }

    pub fn federation(&self) -> &FederationClient {
        &self.federation
    }

    /// Builds the local graph that contains all facts the knowledge network knows for the
    /// patterns of `query`, together with the knowledge gaps reported for the main pattern.
    pub async fn construct_graph(
        &self,
        requester_id: &str,
        query: &Query,
        gaps_enabled: bool,
    ) -> Result<(Graph, Vec<KnowledgeGap>), MediatorError> {
        let decomposition = resolve_values(decompose_query(query)?);
        debug!("Decomposed query into\n{decomposition}");

        let mut graph = Graph::new();
        let mut knowledge_gaps = Vec::new();
        let Some(answers) = self
            .ask_where(requester_id, &decomposition, gaps_enabled)
            .await?
        else {
            return Ok((graph, knowledge_gaps));
        };

        materialize_answer(&mut graph, &decomposition.main_pattern, &answers.main)?;
        knowledge_gaps.extend(answers.main.knowledge_gap);
        for (pattern, answer) in decomposition.optional_patterns.iter().zip(&answers.optional) {
            materialize_answer(&mut graph, pattern, answer)?;
        }
        info!("Materialized {} triples into the local graph", graph.len());

        Ok((graph, knowledge_gaps))
    }

    /// Answers a SELECT query.
    ///
    /// If `gaps_enabled` and the knowledge network reported knowledge gaps, the result consists
    /// of a single empty row and the gaps explain what is missing.
    pub async fn handle_query(
        &self,
        requester_id: &str,
        query_text: &str,
        gaps_enabled: bool,
    ) -> Result<QueryResponse, MediatorError> {
        info!("Received query from requester '{requester_id}'");
        let query = Query::parse(query_text, None)?;
        let (graph, knowledge_gaps) = self
            .construct_graph(requester_id, &query, gaps_enabled)
            .await?;

        let solutions = self.evaluator.evaluate(&graph, query_text)?;
        let rows = if gaps_enabled && !knowledge_gaps.is_empty() {
            info!("Knowledge network reported {} knowledge gaps", knowledge_gaps.len());
            vec![BindingRow::new()]
        } else {
            solutions.rows
        };

        Ok(QueryResponse {
            variables: solutions.variables,
            rows,
            knowledge_gaps: gaps_enabled.then_some(knowledge_gaps),
        })
    }

    /// Executes an `INSERT { .. } WHERE { .. }` update by posting the insert pattern with the
    /// bindings of its WHERE clause.
    pub async fn handle_update(
        &self,
        requester_id: &str,
        update_text: &str,
    ) -> Result<UpdateOutcome, MediatorError> {
        info!("Received update from requester '{requester_id}'");
        let update = Update::parse(update_text, None)?;
        let decomposition = resolve_values(decompose_update(&update)?);
        debug!("Decomposed update into\n{decomposition}");

        let Some(answers) = self.ask_where(requester_id, &decomposition, false).await? else {
            return Ok(UpdateOutcome::default());
        };

        let posted_bindings = std::iter::once(&answers.main)
            .chain(&answers.optional)
            .flat_map(|answer| &answer.binding_set)
            .map(|row| row.restrict_to(&decomposition.insert_pattern))
            .unique()
            .collect::<Vec<_>>();
        if posted_bindings.is_empty() {
            info!("The WHERE clause has no bindings, nothing is posted");
            return Ok(UpdateOutcome::default());
        }

        let PostOutcome { result_binding_set } = self
            .federation
            .post(requester_id, &decomposition.insert_pattern, &posted_bindings)
            .await?;
        info!(
            "Posted {} bindings for the insert pattern",
            posted_bindings.len()
        );

        Ok(UpdateOutcome {
            posted_bindings,
            result_binding_set,
        })
    }

    /// Unregisters all knowledge bases that were registered on behalf of requesters.
    pub async fn close(&self) {
        self.federation.close().await;
    }

    /// Asks the main pattern and then all optional patterns of `decomposition`.
    ///
    /// Returns [None] if nothing needs to be asked: either there is no main pattern or the
    /// `VALUES` clauses admit no solution.
    async fn ask_where(
        &self,
        requester_id: &str,
        decomposition: &RequestDecomposition,
        gaps_enabled: bool,
    ) -> Result<Option<WhereAnswers>, MediatorError> {
        if decomposition.main_pattern.is_empty() {
            info!("No main pattern was derived from the request, the result is empty");
            return Ok(None);
        }
        let arguments = match decomposition.values_clauses.first() {
            None => vec![BindingRow::new()],
            Some(rows) if rows.is_empty() => {
                info!("The VALUES clauses admit no solution, the result is empty");
                return Ok(None);
            }
            Some(rows) => rows.clone(),
        };

        let main = self
            .federation
            .ask(
                requester_id,
                &decomposition.main_pattern,
                &arguments,
                gaps_enabled,
            )
            .await?;
        // All asks run to completion, each one unregisters its interaction even if another fails.
        let optional = join_all(
            decomposition
                .optional_patterns
                .iter()
                .map(|pattern| self.federation.ask(requester_id, pattern, &[], false)),
        )
        .await
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;
        info!("Knowledge network responded to all patterns");

        Ok(Some(WhereAnswers { main, optional }))
    }
}

fn materialize_answer(
    graph: &mut Graph,
    pattern: &PatternGroup,
    answer: &AskOutcome,
) -> Result<usize, FederationError> {
    Ok(materialize(graph, pattern, &answer.binding_set)?)
}
