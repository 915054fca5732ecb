//! Response cache port and request fingerprinting
//!
//! Gateway outputs are memoized under a deterministic fingerprint of the
//! full generation input. The port is infallible: a cache failure must
//! never fail a turn, so adapters degrade to a miss and log internally
//! instead of surfacing errors.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::time::Duration;
use thinktank_domain::Model;

/// Version tag mixed into every fingerprint so a change to the context
/// serialization format invalidates old entries.
pub const PROTOCOL_VERSION: &str = "v1";

/// Deterministic cache key over generation inputs.
///
/// Identical inputs always map to the same key, enabling genuine
/// deduplication of repeated requests across threads and turns.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Hash the ordered parts into a hex key
    pub fn compute(parts: &[&str]) -> Self {
        let mut hasher = Sha256::new();
        for part in parts {
            hasher.update(part.as_bytes());
        }
        Self(format!("{:x}", hasher.finalize()))
    }

    /// Fingerprint for one generation request: protocol version, model,
    /// stringified sampling parameters, full conversation context, and
    /// the reference-document text, in that order.
    pub fn for_request(
        model: &Model,
        temperature: f32,
        max_tokens: u32,
        context: &str,
        reference: &str,
    ) -> Self {
        Self::compute(&[
            PROTOCOL_VERSION,
            model.as_str(),
            &temperature.to_string(),
            &max_tokens.to_string(),
            context,
            reference,
        ])
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Memoization of gateway outputs with per-entry time-to-live.
///
/// A hit is valid only strictly before the stored expiry; an expired
/// entry is a miss and is eligible to be overwritten. Concurrent writes
/// to the same key are last-writer-wins, acceptable because content is
/// deterministic per fingerprint.
#[async_trait]
pub trait ResponseCache: Send + Sync {
    async fn get(&self, fingerprint: &Fingerprint) -> Option<String>;

    async fn put(&self, fingerprint: Fingerprint, text: String, ttl: Duration);
}
