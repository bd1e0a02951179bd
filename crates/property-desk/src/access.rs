//! Admin credential gate for privileged routes.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use sha2::{Digest, Sha256};

use crate::error::ApiError;

/// Caller identity established by a successful credential check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminIdentity {
    pub subject: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    #[error("missing or malformed bearer credential")]
    MissingCredential,
    #[error("credential rejected")]
    Rejected,
    #[error("admin access is not configured")]
    NotConfigured,
}

/// Verifies an opaque admin credential.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<AdminIdentity, AccessError>;
}

/// Accepts a single shared token. Comparison runs over SHA-256 digests so neither the token
/// length nor a matching prefix changes the comparison time.
pub struct StaticTokenVerifier {
    expected: Option<[u8; 32]>,
}

impl StaticTokenVerifier {
    pub fn new(token: Option<&str>) -> Self {
        Self {
            expected: token.map(digest),
        }
    }
}

impl fmt::Debug for StaticTokenVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticTokenVerifier")
            .field("configured", &self.expected.is_some())
            .finish()
    }
}

fn digest(token: &str) -> [u8; 32] {
    Sha256::digest(token.as_bytes()).into()
}

#[async_trait]
impl CredentialVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> Result<AdminIdentity, AccessError> {
        let expected = self.expected.ok_or(AccessError::NotConfigured)?;
        let presented = digest(token);
        let difference = expected
            .iter()
            .zip(presented.iter())
            .fold(0u8, |acc, (left, right)| acc | (left ^ right));

        if difference == 0 {
            Ok(AdminIdentity {
                subject: "admin".to_string(),
            })
        } else {
            Err(AccessError::Rejected)
        }
    }
}

/// Shared handle routers use to check admin credentials.
#[derive(Clone)]
pub struct AccessGate {
    verifier: Arc<dyn CredentialVerifier>,
}

impl AccessGate {
    pub fn new(verifier: Arc<dyn CredentialVerifier>) -> Self {
        Self { verifier }
    }

    pub fn static_token(token: Option<&str>) -> Self {
        Self::new(Arc::new(StaticTokenVerifier::new(token)))
    }

    pub async fn require_admin(&self, headers: &HeaderMap) -> Result<AdminIdentity, AccessError> {
        let token = bearer_token(headers).ok_or(AccessError::MissingCredential)?;
        self.verifier.verify(token).await
    }
}

impl fmt::Debug for AccessGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessGate").finish_non_exhaustive()
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let mut parts = value.splitn(2, ' ');

    let scheme = parts.next()?;
    let token = parts.next()?.trim();

    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return None;
    }

    Some(token)
}

/// Extractor that rejects the request with 401 unless the caller presents an admin credential.
#[derive(Debug, Clone)]
pub struct AdminAccess(pub AdminIdentity);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AdminAccess
where
    AccessGate: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let gate = AccessGate::from_ref(state);
        let identity = gate.require_admin(&parts.headers).await?;
        Ok(Self(identity))
    }
}

/// Router state pairing a domain service with the access gate.
pub struct GuardedState<S> {
    pub service: Arc<S>,
    pub gate: AccessGate,
}

impl<S> GuardedState<S> {
    pub fn new(service: Arc<S>, gate: AccessGate) -> Self {
        Self { service, gate }
    }
}

impl<S> Clone for GuardedState<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            gate: self.gate.clone(),
        }
    }
}

impl<S> FromRef<GuardedState<S>> for AccessGate {
    fn from_ref(state: &GuardedState<S>) -> Self {
        state.gate.clone()
    }
}
