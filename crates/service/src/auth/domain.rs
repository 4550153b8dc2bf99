use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Decoded token claims, attached to the request after the access gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthClaims(pub Map<String, Value>);

impl AuthClaims {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The `email` claim, which clients conventionally sign.
    pub fn email(&self) -> Option<&str> {
        self.0.get("email").and_then(Value::as_str)
    }

    pub fn expires_at(&self) -> Option<i64> {
        self.0.get("exp").and_then(Value::as_i64)
    }
}
