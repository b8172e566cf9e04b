use crate::auth::Requester;
use crate::content_negotiation::ResultsFormat;
use crate::error::MediatorServerError;
use crate::results::QueryResultsResponse;
use crate::sparql::SparqlQuery;
use crate::AppState;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderMap;
use serde::Deserialize;
use tracing::info;

#[derive(Deserialize)]
pub struct QueryParams {
    #[serde(default)]
    query: Option<String>,
}

/// Query via GET. The query is a URL-encoded parameter and the request must not have a body.
pub async fn handle_query_get(
    State(state): State<AppState>,
    Requester(requester): Requester,
    format: ResultsFormat,
    Query(params): Query<QueryParams>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<QueryResultsResponse, MediatorServerError> {
    info!("Received GET request /query/ to be handled");
    if !body.is_empty() {
        return Err(MediatorServerError::BadRequest(
            "You MUST NOT provide a message body".to_owned(),
        ));
    }
    if headers.contains_key(CONTENT_TYPE) {
        return Err(MediatorServerError::BadRequest(
            "You MUST NOT provide a Content-Type".to_owned(),
        ));
    }
    let Some(query) = params.query else {
        return Err(MediatorServerError::BadRequest(
            "You should provide a URL-encoded query as a query string parameter".to_owned(),
        ));
    };

    evaluate(&state, &requester, &query, false, format).await
}

/// Query via POST, either directly or URL-encoded.
pub async fn handle_query_post(
    State(state): State<AppState>,
    Requester(requester): Requester,
    format: ResultsFormat,
    SparqlQuery(query): SparqlQuery,
) -> Result<QueryResultsResponse, MediatorServerError> {
    info!("Received POST request /query/ to be handled");
    evaluate(&state, &requester, &query, false, format).await
}

/// Query via POST that reports the knowledge gaps of the knowledge network.
pub async fn handle_query_with_gaps_post(
    State(state): State<AppState>,
    Requester(requester): Requester,
    format: ResultsFormat,
    SparqlQuery(query): SparqlQuery,
) -> Result<QueryResultsResponse, MediatorServerError> {
    info!("Received POST request /query-with-gaps/ to be handled");
    evaluate(&state, &requester, &query, true, format).await
}

async fn evaluate(
    state: &AppState,
    requester: &str,
    query: &str,
    gaps_enabled: bool,
    format: ResultsFormat,
) -> Result<QueryResultsResponse, MediatorServerError> {
    let response = state
        .mediator
        .handle_query(requester, query, gaps_enabled)
        .await?;
    info!("Answered query with {} rows", response.rows.len());
    Ok(QueryResultsResponse {
        document: response.into(),
        format,
    })
}
