//! In-memory thread store

use async_trait::async_trait;
use std::collections::HashMap;
use thinktank_application::{StoreError, ThreadStore};
use thinktank_domain::{ChatMessage, Model, Thread};
use tokio::sync::RwLock;

/// Thread storage backed by a process-local map.
///
/// Threads are created on first touch with the default participant set.
/// Individual operations are atomic; concurrent turns on the same thread
/// may interleave appends, which callers serialize if they need strict
/// ordering.
#[derive(Default)]
pub struct InMemoryThreadStore {
    threads: RwLock<HashMap<String, Thread>>,
}

impl InMemoryThreadStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ThreadStore for InMemoryThreadStore {
    async fn thread(&self, id: &str) -> Result<Thread, StoreError> {
        let mut threads = self.threads.write().await;
        let thread = threads.entry(id.to_string()).or_insert_with(|| Thread::new(id));
        Ok(thread.clone())
    }

    async fn append(&self, id: &str, message: ChatMessage) -> Result<(), StoreError> {
        let mut threads = self.threads.write().await;
        threads
            .entry(id.to_string())
            .or_insert_with(|| Thread::new(id))
            .push(message);
        Ok(())
    }

    async fn participants(&self, id: &str) -> Result<Vec<Model>, StoreError> {
        let mut threads = self.threads.write().await;
        let thread = threads.entry(id.to_string()).or_insert_with(|| Thread::new(id));
        Ok(thread.participants.clone())
    }

    async fn set_participants(
        &self,
        id: &str,
        participants: Vec<Model>,
    ) -> Result<(), StoreError> {
        let mut threads = self.threads.write().await;
        threads
            .entry(id.to_string())
            .or_insert_with(|| Thread::new(id))
            .set_participants(participants);
        Ok(())
    }
}
