use crate::error::MediatorServerError;
use crate::AppState;
use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use axum::RequestPartsExt;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// The requester used for all requests if tokens are disabled.
pub const DEFAULT_REQUESTER: &str = "requester";

#[derive(Debug, thiserror::Error)]
pub enum TokenFileError {
    #[error("Could not read the tokens file: {0}")]
    Io(#[from] std::io::Error),
    #[error("The tokens file is not a list of token and requester pairs: {0}")]
    Format(#[from] serde_json::Error),
}

#[derive(Deserialize)]
struct TokenEntry {
    token: String,
    requester: String,
}

/// Maps the secret tokens of requests to the identity of the requester.
#[derive(Debug, Clone)]
pub struct TokenRegistry {
    /// [None] if tokens are disabled.
    requesters: Option<HashMap<String, String>>,
}

impl TokenRegistry {
    /// Accepts every request on behalf of [DEFAULT_REQUESTER].
    pub fn disabled() -> Self {
        Self { requesters: None }
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            requesters: Some(pairs.into_iter().collect()),
        }
    }

    /// Loads a JSON file of the form `[{"token": "..", "requester": ".."}]`.
    pub fn load(path: &Path) -> Result<Self, TokenFileError> {
        let content = std::fs::read(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &[u8]) -> Result<Self, TokenFileError> {
        let entries: Vec<TokenEntry> = serde_json::from_slice(content)?;
        Ok(Self::from_pairs(
            entries.into_iter().map(|e| (e.token, e.requester)),
        ))
    }

    pub fn is_enabled(&self) -> bool {
        self.requesters.is_some()
    }

    pub fn requester_for(&self, token: Option<&str>) -> Result<String, MediatorServerError> {
        let Some(requesters) = &self.requesters else {
            return Ok(DEFAULT_REQUESTER.to_owned());
        };
        let token = token.ok_or_else(|| {
            MediatorServerError::Unauthorized(
                "Tokens are enabled, you should provide a token query parameter".to_owned(),
            )
        })?;
        requesters.get(token).cloned().ok_or_else(|| {
            MediatorServerError::Unauthorized("Invalid token, you should provide a valid token".to_owned())
        })
    }
}

#[derive(Deserialize)]
struct TokenParams {
    #[serde(default)]
    token: Option<String>,
}

/// The identity on whose behalf a request is answered.
pub struct Requester(pub String);

impl FromRequestParts<AppState> for Requester {
    type Rejection = MediatorServerError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let params = parts
            .extract::<Query<TokenParams>>()
            .await
            .map_err(|e| MediatorServerError::BadRequest(e.to_string()))?
            .0;
        let requester = state.tokens.requester_for(params.token.as_deref())?;
        Ok(Requester(requester))
    }
}
