//! Session resolution.
//!
//! Sign-in lives outside this service. A [`SessionResolver`] turns request
//! headers into a [`Session`]; handlers take [`AuthSession`] and get a 401
//! before any storage call when there is none.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap, HeaderName},
};

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
}

#[async_trait]
pub trait SessionResolver: Send + Sync {
    async fn resolve(&self, headers: &HeaderMap) -> Option<Session>;
}

/// Trusts a header set by the gateway in front of the service
pub struct HeaderSessionResolver {
    header: HeaderName,
}

impl HeaderSessionResolver {
    pub fn new(header: &str) -> Result<Self, ApiError> {
        let header = HeaderName::try_from(header)
            .map_err(|e| ApiError::Config(format!("invalid auth header {:?}: {}", header, e)))?;
        Ok(Self { header })
    }
}

#[async_trait]
impl SessionResolver for HeaderSessionResolver {
    async fn resolve(&self, headers: &HeaderMap) -> Option<Session> {
        let user_id = headers.get(&self.header)?.to_str().ok()?.trim();
        if user_id.is_empty() {
            return None;
        }
        Some(Session {
            user_id: user_id.to_string(),
        })
    }
}

/// Extractor for the signed-in user
#[derive(Debug, Clone)]
pub struct AuthSession(pub Session);

impl AuthSession {
    pub fn user_id(&self) -> &str {
        &self.0.user_id
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        state
            .sessions
            .resolve(&parts.headers)
            .await
            .map(AuthSession)
            .ok_or(ApiError::Unauthorized)
    }
}
