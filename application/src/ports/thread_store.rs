//! Thread store port
//!
//! The coordinator never holds thread state itself; every read goes
//! against the latest stored state at the time of the call. Individual
//! operations are atomic, but concurrent turns on the same thread are not
//! serialized; callers wanting strict ordering serialize per thread.

use async_trait::async_trait;
use thinktank_domain::{ChatMessage, Model, Thread};
use thiserror::Error;

/// Errors from store adapters
///
/// The in-memory implementations are infallible; the variants exist for
/// durable backends.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Thread not found: {0}")]
    NotFound(String),

    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Storage for threads and their message logs
///
/// Threads are created on first touch with the default participant set;
/// no operation fails on an unknown thread id.
#[async_trait]
pub trait ThreadStore: Send + Sync {
    /// Snapshot of the thread: ordered messages plus participants
    async fn thread(&self, id: &str) -> Result<Thread, StoreError>;

    /// Append a message to the thread's ordered log
    async fn append(&self, id: &str, message: ChatMessage) -> Result<(), StoreError>;

    /// Current participant set
    async fn participants(&self, id: &str) -> Result<Vec<Model>, StoreError>;

    /// Replace the participant set wholesale
    async fn set_participants(&self, id: &str, participants: Vec<Model>)
        -> Result<(), StoreError>;
}
