use crate::error::MediatorServerError;
use crate::sparql::query::{handle_query_get, handle_query_post, handle_query_with_gaps_post};
use crate::sparql::update::handle_update_post;
use crate::AppState;
use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Form, Router};
use mediatype::names::APPLICATION;
use mediatype::{MediaType, Name};
use std::collections::HashMap;

mod query;
mod update;

static SPARQL_QUERY: MediaType<'static> =
    MediaType::new(APPLICATION, Name::new_unchecked("sparql-query"));
static SPARQL_UPDATE: MediaType<'static> =
    MediaType::new(APPLICATION, Name::new_unchecked("sparql-update"));
static FORM_URL_ENCODED: MediaType<'static> =
    MediaType::new(APPLICATION, Name::new_unchecked("x-www-form-urlencoded"));

pub fn create_sparql_routes() -> Router<AppState> {
    Router::new()
        .route("/query/", get(handle_query_get).post(handle_query_post))
        .route("/query-with-gaps/", post(handle_query_with_gaps_post))
        .route("/update/", post(handle_update_post))
}

/// The text of a SPARQL query sent by POST, either directly or URL-encoded.
pub struct SparqlQuery(pub String);

/// The text of a SPARQL update sent by POST, either directly or URL-encoded.
pub struct SparqlUpdate(pub String);

impl FromRequest<AppState> for SparqlQuery {
    type Rejection = MediatorServerError;

    async fn from_request(request: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        read_operation(request, state, &SPARQL_QUERY, "query")
            .await
            .map(SparqlQuery)
    }
}

impl FromRequest<AppState> for SparqlUpdate {
    type Rejection = MediatorServerError;

    async fn from_request(request: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        read_operation(request, state, &SPARQL_UPDATE, "update")
            .await
            .map(SparqlUpdate)
    }
}

/// How the operation is carried in the request body.
#[derive(Debug, PartialEq, Eq)]
enum BodyKind {
    Direct,
    UrlEncoded,
}

/// Reads an operation sent as body of type `direct_media_type` or as the form field `field`.
async fn read_operation(
    request: Request,
    state: &AppState,
    direct_media_type: &MediaType<'static>,
    field: &str,
) -> Result<String, MediatorServerError> {
    match body_kind(request.headers(), direct_media_type) {
        Some(BodyKind::Direct) => {
            let body = Bytes::from_request(request, state)
                .await
                .map_err(|e| MediatorServerError::BadRequest(e.to_string()))?;
            String::from_utf8(body.to_vec()).map_err(|_| {
                MediatorServerError::BadRequest("The request body is not valid UTF-8".to_owned())
            })
        }
        Some(BodyKind::UrlEncoded) => {
            let Form(mut parameters) = Form::<HashMap<String, String>>::from_request(request, state)
                .await
                .map_err(|e| MediatorServerError::BadRequest(e.to_string()))?;
            parameters.remove(field).ok_or_else(|| {
                MediatorServerError::BadRequest(format!(
                    "You must provide a URL-encoded body parameter called '{field}'"
                ))
            })
        }
        None => Err(MediatorServerError::UnsupportedMediaType(format!(
            "The Content-Type must either be '{direct_media_type}' or '{FORM_URL_ENCODED}'"
        ))),
    }
}

/// Matches the essence of the Content-Type header, ignoring parameters and case.
fn body_kind(headers: &HeaderMap, direct_media_type: &MediaType<'_>) -> Option<BodyKind> {
    let value = headers.get(CONTENT_TYPE)?.to_str().ok()?.to_ascii_lowercase();
    let media_type = MediaType::parse(&value).ok()?;
    let essence = media_type.essence();
    if essence == *direct_media_type {
        Some(BodyKind::Direct)
    } else if essence == FORM_URL_ENCODED {
        Some(BodyKind::UrlEncoded)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(content_type: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        headers
    }

    #[test]
    fn content_type_parameters_and_case_are_ignored() {
        assert_eq!(
            body_kind(
                &headers("Application/SPARQL-Query; charset=utf-8"),
                &SPARQL_QUERY
            ),
            Some(BodyKind::Direct)
        );
        assert_eq!(
            body_kind(
                &headers("application/x-www-form-urlencoded;charset=UTF-8"),
                &SPARQL_QUERY
            ),
            Some(BodyKind::UrlEncoded)
        );
    }

    #[test]
    fn other_content_types_are_rejected() {
        assert_eq!(
            body_kind(&headers("application/sparql-update"), &SPARQL_QUERY),
            None
        );
        assert_eq!(body_kind(&headers("not a media type"), &SPARQL_QUERY), None);
        assert_eq!(body_kind(&HeaderMap::new(), &SPARQL_QUERY), None);
    }
}
