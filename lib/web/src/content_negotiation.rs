use crate::error::MediatorServerError;
use crate::AppState;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use headers::HeaderMapExt;
use headers_accept::Accept;
use mediatype::names::{APPLICATION, JSON};
use mediatype::{MediaType, Name};

/// The serialization of query results that was negotiated with the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultsFormat {
    /// `application/sparql-results+json`
    SparqlJson,
    /// `application/json`, same document as [ResultsFormat::SparqlJson].
    Json,
}

impl ResultsFormat {
    pub fn media_type(self) -> &'static str {
        match self {
            ResultsFormat::SparqlJson => "application/sparql-results+json",
            ResultsFormat::Json => "application/json",
        }
    }
}

/// Handles the content-negotiation for requests that return query results.
impl FromRequestParts<AppState> for ResultsFormat {
    type Rejection = MediatorServerError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        static MEDIA_TYPES: [MediaType<'_>; 2] = [
            MediaType::new(APPLICATION, Name::new_unchecked("sparql-results+json")),
            MediaType::new(APPLICATION, JSON),
        ];
        static DEFAULT_MEDIA_TYPE: MediaType<'_> =
            MediaType::new(APPLICATION, Name::new_unchecked("sparql-results+json"));

        let accept = parts.headers.typed_get::<Accept>();
        let media_type = content_negotiation(
            accept,
            &MEDIA_TYPES,
            &DEFAULT_MEDIA_TYPE,
            "application/sparql-results+json or application/json",
        )?;

        if media_type.subty == JSON {
            Ok(ResultsFormat::Json)
        } else {
            Ok(ResultsFormat::SparqlJson)
        }
    }
}

fn content_negotiation<'media>(
    accept: Option<Accept>,
    available: &'media [MediaType<'media>],
    default: &'media MediaType<'media>,
    example: &str,
) -> Result<MediaType<'media>, MediatorServerError> {
    let Some(accept) = accept else {
        return Ok(default.clone());
    };

    match accept.negotiate(available) {
        None => Err(MediatorServerError::ContentNegotiation(format!(
            "The accept header does not provide any accepted format like {example}."
        ))),
        Some(result) => Ok(result.clone()),
    }
}
