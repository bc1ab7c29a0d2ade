//! Identity-provider token verification
//!
//! The SNS service never issues credentials. Callers present a bearer JWT
//! minted by the external identity provider; this crate checks the signature,
//! expiry and (optionally) issuer and hands back the subject as the caller's
//! external identity id.
//!
//! Production deployments verify RS256 tokens with the provider's public key.
//! An HS256 shared secret is accepted for local development only.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Errors raised while building a verifier or checking a token
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("invalid verification key: {0}")]
    InvalidKey(String),

    #[error("token rejected: {0}")]
    Rejected(String),

    #[error("token has an empty subject")]
    EmptySubject,
}

/// Claims read from identity-provider tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// External identity id
    pub sub: String,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Display name, when the provider includes one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Identity extracted from a verified token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub external_id: String,
    pub name: Option<String>,
}

/// Verifies bearer tokens against a single key
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("algorithms", &self.validation.algorithms)
            .field("key", &"[REDACTED]")
            .finish()
    }
}

impl TokenVerifier {
    /// RS256 verifier from the provider's PEM-encoded public key.
    pub fn from_rsa_pem(public_key_pem: &str, issuer: Option<&str>) -> Result<Self, TokenError> {
        let key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())
            .map_err(|e| TokenError::InvalidKey(format!("RSA public key: {e}")))?;
        Ok(Self::with_key(key, Algorithm::RS256, issuer))
    }

    /// HS256 verifier from a shared secret.
    pub fn from_hs256_secret(secret: &[u8], issuer: Option<&str>) -> Result<Self, TokenError> {
        if secret.len() < 32 {
            return Err(TokenError::InvalidKey(
                "HS256 secret must be at least 32 bytes".into(),
            ));
        }
        Ok(Self::with_key(
            DecodingKey::from_secret(secret),
            Algorithm::HS256,
            issuer,
        ))
    }

    fn with_key(key: DecodingKey, algorithm: Algorithm, issuer: Option<&str>) -> Self {
        let mut validation = Validation::new(algorithm);
        validation.validate_exp = true;
        if let Some(iss) = issuer {
            validation.set_issuer(&[iss]);
        }
        Self { key, validation }
    }

    /// Check signature and claims, returning the caller's identity.
    pub fn verify(&self, token: &str) -> Result<VerifiedIdentity, TokenError> {
        let data = decode::<Claims>(token, &self.key, &self.validation)
            .map_err(|e| TokenError::Rejected(e.to_string()))?;

        let external_id = data.claims.sub.trim().to_string();
        if external_id.is_empty() {
            return Err(TokenError::EmptySubject);
        }

        Ok(VerifiedIdentity {
            external_id,
            name: data
                .claims
                .name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
        })
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header_value: &str) -> Option<&str> {
    let (scheme, token) = header_value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
