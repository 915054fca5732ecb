//! Document collaborator port
//!
//! The coordinator treats the document subsystem as an external
//! collaborator: it only consumes [`DocumentStore::reference_text`], an
//! opaque string of relevance-ranked excerpts appended to generation
//! context. The management operations exist for the presentation layer.

use crate::ports::thread_store::StoreError;
use async_trait::async_trait;
use thinktank_domain::Document;
use uuid::Uuid;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Attach a document to a thread
    async fn add(&self, thread_id: &str, document: Document) -> Result<(), StoreError>;

    /// All documents attached to a thread
    async fn list(&self, thread_id: &str) -> Result<Vec<Document>, StoreError>;

    /// Toggle whether a document contributes to reference context
    async fn set_enabled(
        &self,
        thread_id: &str,
        document_id: &Uuid,
        enabled: bool,
    ) -> Result<(), StoreError>;

    /// Detach every document from a thread
    async fn clear(&self, thread_id: &str) -> Result<(), StoreError>;

    /// Concatenated, relevance-ranked excerpts from the thread's enabled
    /// documents, no longer than `max_chars`; empty when none are enabled.
    async fn reference_text(
        &self,
        thread_id: &str,
        max_chars: usize,
        query: &str,
    ) -> Result<String, StoreError>;
}
