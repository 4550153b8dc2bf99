use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header as JwtHeader, Validation};
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use super::domain::AuthClaims;
use super::errors::AuthError;

/// Token service configuration
#[derive(Clone)]
pub struct TokenConfig {
    pub secret: String,
    pub ttl_secs: u64,
}

impl From<&configs::AuthConfig> for TokenConfig {
    fn from(cfg: &configs::AuthConfig) -> Self {
        Self { secret: cfg.access_token_secret.clone(), ttl_secs: cfg.token_ttl_secs }
    }
}

/// Signs and verifies bearer tokens, independent of web framework
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(cfg: TokenConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            ttl: Duration::seconds(i64::try_from(cfg.ttl_secs).unwrap_or(i64::MAX / 1000)),
        }
    }

    /// Sign a JSON object as claims, adding `iat` and `exp`.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{TokenConfig, TokenService};
    /// let svc = TokenService::new(TokenConfig { secret: "secret".into(), ttl_secs: 60 });
    /// let token = svc.sign(serde_json::json!({"email": "a@x.com"})).unwrap();
    /// let claims = svc.verify(&token).unwrap();
    /// assert_eq!(claims.email(), Some("a@x.com"));
    /// ```
    pub fn sign(&self, claims: Value) -> Result<String, AuthError> {
        let Value::Object(mut map) = claims else {
            return Err(AuthError::InvalidClaims("payload must be a JSON object".into()));
        };
        if map.contains_key("exp") {
            return Err(AuthError::InvalidClaims("payload already has an \"exp\" property".into()));
        }
        let now = Utc::now();
        map.insert("iat".into(), Value::from(now.timestamp()));
        map.insert("exp".into(), Value::from((now + self.ttl).timestamp()));
        encode(&JwtHeader::default(), &map, &self.encoding).map_err(|e| AuthError::TokenError(e.to_string()))
    }

    /// Check signature and expiry, returning the claims.
    pub fn verify(&self, token: &str) -> Result<AuthClaims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        decode::<Map<String, Value>>(token, &self.decoding, &validation)
            .map(|data| AuthClaims(data.claims))
            .map_err(|e| AuthError::Unauthorized(e.to_string()))
    }

    /// Gate on an `Authorization` header value.
    /// Absent or blank header is `Unauthenticated`; anything that is not a valid `Bearer` token is `Unauthorized`.
    #[instrument(skip_all)]
    pub fn authorize(&self, authorization: Option<&str>) -> Result<AuthClaims, AuthError> {
        let header = authorization
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .ok_or(AuthError::Unauthenticated)?;
        let mut parts = header.split_whitespace();
        let scheme = parts.next().unwrap_or_default();
        if !scheme.eq_ignore_ascii_case("bearer") {
            return Err(AuthError::Unauthorized("expected Bearer scheme".into()));
        }
        let token = parts
            .next()
            .ok_or_else(|| AuthError::Unauthorized("missing bearer credential".into()))?;
        let claims = self.verify(token)?;
        debug!(exp = claims.expires_at(), "bearer token accepted");
        Ok(claims)
    }
}
