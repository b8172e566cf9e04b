use crate::auth::Requester;
use crate::error::MediatorServerError;
use crate::sparql::SparqlUpdate;
use crate::AppState;
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Serialize)]
pub struct UpdateResponse {
    message: &'static str,
    posted_bindings: usize,
}

/// Update via POST, either directly or URL-encoded.
pub async fn handle_update_post(
    State(state): State<AppState>,
    Requester(requester): Requester,
    SparqlUpdate(update): SparqlUpdate,
) -> Result<Json<UpdateResponse>, MediatorServerError> {
    info!("Received POST request /update/ to be handled");
    let outcome = state.mediator.handle_update(&requester, &update).await?;

    let message = if outcome.is_posted() {
        "Insert pattern was successfully posted to the knowledge network!"
    } else {
        "The WHERE clause has no bindings, nothing was posted to the knowledge network."
    };
    Ok(Json(UpdateResponse {
        message,
        posted_bindings: outcome.posted_bindings.len(),
    }))
}
