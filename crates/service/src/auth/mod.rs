//! Auth module: bearer token issuance and verification (domain, errors, service).
//!
//! Tokens are HS256 JWTs whose claims are whatever JSON object the caller
//! asked to sign, plus `iat`/`exp`.

pub mod domain;
pub mod errors;
pub mod service;

pub use service::{TokenConfig, TokenService};
