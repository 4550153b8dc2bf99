//! Service layer for the marketplace backend.
//! - `filter`, `projection` and `upsert` hold the lookup and write rules.
//! - `storage` abstracts the document store (JSON file or Postgres).
//! - `resources` exposes one service per collection; `auth` signs and checks tokens.

pub mod auth;
pub mod errors;
pub mod filter;
pub mod projection;
pub mod resources;
pub mod runtime;
pub mod seed;
pub mod storage;
pub mod upsert;
#[cfg(test)]
pub mod test_support;
