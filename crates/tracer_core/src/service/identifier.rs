//! Query token generation for minted document identifiers.
//!
//! The token is reused as `{identifier}` in every nested IIIF URI of one
//! response:
//!
//! ```text
//! {base}/trace/{token}/range/{uuid}
//! {base}/trace/{token}/annotation/{uuid}
//! ```
//!
//! # Invariants
//! - Same generator + same query string -> same token.
//! - `PerProcess` tokens change across restarts; `Fixed` tokens do not.

use std::collections::hash_map::{DefaultHasher, RandomState};
use std::hash::{BuildHasher, Hasher};

/// Keying strategy for the query hash.
#[derive(Debug, Clone)]
enum TokenKeys {
    /// Random keys drawn once when the generator is built.
    PerProcess(RandomState),
    /// Fixed zero keys; stable across restarts of the same build.
    Fixed,
}

/// Derives compact hex tokens from canonical query URLs.
#[derive(Debug, Clone)]
pub struct QueryTokenGenerator {
    keys: TokenKeys,
}

impl QueryTokenGenerator {
    /// Generator whose tokens are stable only for the current process.
    pub fn per_process() -> Self {
        Self {
            keys: TokenKeys::PerProcess(RandomState::new()),
        }
    }

    /// Generator whose tokens survive restarts.
    pub fn fixed() -> Self {
        Self {
            keys: TokenKeys::Fixed,
        }
    }

    /// Returns the lowercase hex token for `query_url`.
    pub fn token(&self, query_url: &str) -> String {
        let mut hasher = match &self.keys {
            TokenKeys::PerProcess(state) => state.build_hasher(),
            TokenKeys::Fixed => DefaultHasher::new(),
        };
        hasher.write(query_url.as_bytes());
        format!("{:x}", hasher.finish())
    }
}
