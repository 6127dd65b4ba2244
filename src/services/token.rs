// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Access and refresh token issuance and validation.
//!
//! Tokens are HS256 JWTs. Access and refresh tokens are signed with different
//! secrets so neither kind can be minted from the other's key.
//!
//! Refresh tokens are stateless: a refresh token stays usable until it
//! expires, even after it has been exchanged for a new pair.

use jsonwebtoken::{
    decode, decode_header, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header,
    Validation,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::TokenConfig;
use crate::time_utils::unix_now;

const ALGORITHM: Algorithm = Algorithm::HS256;

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    pub username: String,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
    /// Issued at (Unix timestamp)
    pub iat: u64,
}

/// The authenticated identity a token speaks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub username: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

/// A freshly issued access/refresh pair. Never persisted.
#[derive(Debug, Clone)]
pub struct TokenDetails {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("Token signature does not match")]
    InvalidSignature,

    #[error("Token has expired")]
    Expired,

    #[error("Token is malformed")]
    MalformedToken,

    #[error("Token uses unexpected algorithm {0:?}")]
    UnexpectedAlgorithm(Algorithm),

    #[error("Token could not be signed: {0}")]
    Signing(String),
}

struct KeyPair {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl KeyPair {
    fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }
}

/// Issues and validates signed, expiring bearer tokens.
pub struct TokenService {
    access: KeyPair,
    refresh: KeyPair,
}

impl TokenService {
    pub fn new(config: &TokenConfig) -> Self {
        Self {
            access: KeyPair::new(&config.access_secret, config.access_ttl),
            refresh: KeyPair::new(&config.refresh_secret, config.refresh_ttl),
        }
    }

    fn keys(&self, kind: TokenKind) -> &KeyPair {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }

    /// Issue a token of the given kind, valid from now until now + TTL.
    pub fn issue(&self, identity: &Identity, kind: TokenKind) -> Result<String, TokenError> {
        self.issue_at(identity, kind, unix_now())
    }

    /// Issue a token as if the current time were `now` (Unix seconds).
    pub fn issue_at(
        &self,
        identity: &Identity,
        kind: TokenKind,
        now: u64,
    ) -> Result<String, TokenError> {
        let keys = self.keys(kind);
        let claims = Claims {
            sub: identity.user_id.clone(),
            username: identity.username.clone(),
            iat: now,
            exp: now.saturating_add(keys.ttl.as_secs()),
        };

        encode(&Header::new(ALGORITHM), &claims, &keys.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Issue a new access + refresh pair.
    pub fn issue_pair(&self, identity: &Identity) -> Result<TokenDetails, TokenError> {
        let now = unix_now();
        Ok(TokenDetails {
            access_token: self.issue_at(identity, TokenKind::Access, now)?,
            refresh_token: self.issue_at(identity, TokenKind::Refresh, now)?,
        })
    }

    /// Validate a token of the given kind against the current time.
    pub fn validate(&self, token: &str, kind: TokenKind) -> Result<Identity, TokenError> {
        self.validate_at(token, kind, unix_now())
    }

    /// Validate a token as if the current time were `now` (Unix seconds).
    ///
    /// The token is valid strictly before its `exp`; there is no leeway.
    pub fn validate_at(
        &self,
        token: &str,
        kind: TokenKind,
        now: u64,
    ) -> Result<Identity, TokenError> {
        let header = decode_header(token).map_err(|_| TokenError::MalformedToken)?;
        if header.alg != ALGORITHM {
            return Err(TokenError::UnexpectedAlgorithm(header.alg));
        }

        let mut validation = Validation::new(ALGORITHM);
        // Expiry is checked below against `now` so callers control the clock.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = decode::<Claims>(token, &self.keys(kind).decoding, &validation).map_err(
            |e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidAlgorithm => TokenError::UnexpectedAlgorithm(header.alg),
                _ => TokenError::MalformedToken,
            },
        )?;

        if now >= data.claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(Identity {
            user_id: data.claims.sub,
            username: data.claims.username,
        })
    }

    /// Exchange a refresh token for a brand-new access + refresh pair.
    ///
    /// The presented refresh token is not revoked.
    pub fn refresh(&self, refresh_token: &str) -> Result<(Identity, TokenDetails), TokenError> {
        let identity = self.validate(refresh_token, TokenKind::Refresh)?;
        let details = self.issue_pair(&identity)?;
        Ok((identity, details))
    }
}
