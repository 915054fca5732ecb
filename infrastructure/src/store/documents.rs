//! In-memory document store with relevance-ranked excerpt assembly

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use thinktank_application::{DocumentStore, StoreError};
use thinktank_domain::Document;
use tokio::sync::RwLock;
use uuid::Uuid;

const CHUNK_SIZE: usize = 800;
const CHUNK_OVERLAP: usize = 100;
const MAX_EXCERPTS: usize = 5;
const SEPARATOR_ALLOWANCE: usize = 8;

/// Document storage backed by a process-local map, keyed by thread id.
#[derive(Default)]
pub struct InMemoryDocumentStore {
    documents: RwLock<HashMap<String, Vec<Document>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Lowercased alphanumeric terms longer than two characters
fn term_set(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| w.len() > 2)
        .map(str::to_string)
        .collect()
}

/// Fixed-size chunks with overlap so a match near a boundary is not lost
fn chunk_text(text: &str) -> Vec<&str> {
    let bytes = text.len();
    let mut chunks = Vec::new();
    let mut start = 0;
    while start < bytes {
        let end = (start + CHUNK_SIZE).min(bytes);
        // Snap to char boundaries for safe slicing.
        let end = (end..=bytes).find(|i| text.is_char_boundary(*i)).unwrap_or(bytes);
        let begin = (0..=start).rev().find(|i| text.is_char_boundary(*i)).unwrap_or(0);
        chunks.push(&text[begin..end]);
        if end == bytes {
            break;
        }
        start = end.saturating_sub(CHUNK_OVERLAP);
    }
    chunks
}

struct ScoredChunk<'a> {
    name: &'a str,
    chunk: &'a str,
    score: usize,
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn add(&self, thread_id: &str, document: Document) -> Result<(), StoreError> {
        self.documents
            .write()
            .await
            .entry(thread_id.to_string())
            .or_default()
            .push(document);
        Ok(())
    }

    async fn list(&self, thread_id: &str) -> Result<Vec<Document>, StoreError> {
        Ok(self
            .documents
            .read()
            .await
            .get(thread_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn set_enabled(
        &self,
        thread_id: &str,
        document_id: &Uuid,
        enabled: bool,
    ) -> Result<(), StoreError> {
        if let Some(docs) = self.documents.write().await.get_mut(thread_id) {
            if let Some(doc) = docs.iter_mut().find(|d| d.id == *document_id) {
                doc.enabled = enabled;
            }
        }
        Ok(())
    }

    async fn clear(&self, thread_id: &str) -> Result<(), StoreError> {
        self.documents.write().await.remove(thread_id);
        Ok(())
    }

    async fn reference_text(
        &self,
        thread_id: &str,
        max_chars: usize,
        query: &str,
    ) -> Result<String, StoreError> {
        let documents = self.documents.read().await;
        let enabled: Vec<&Document> = documents
            .get(thread_id)
            .map(|docs| docs.iter().filter(|d| d.enabled).collect())
            .unwrap_or_default();
        if enabled.is_empty() {
            return Ok(String::new());
        }

        let query_terms = term_set(query);
        let mut scored: Vec<ScoredChunk> = Vec::new();
        for doc in &enabled {
            for chunk in chunk_text(&doc.text) {
                if query_terms.is_empty() {
                    scored.push(ScoredChunk {
                        name: &doc.name,
                        chunk,
                        score: 1,
                    });
                } else {
                    let terms = term_set(chunk);
                    let matches = query_terms.iter().filter(|t| terms.contains(*t)).count();
                    if matches > 0 {
                        scored.push(ScoredChunk {
                            name: &doc.name,
                            chunk,
                            score: matches,
                        });
                    }
                }
            }
        }
        scored.sort_by(|a, b| b.score.cmp(&a.score));

        let mut selected: Vec<String> = Vec::new();
        let mut total = 0;
        for s in &scored {
            let section = format!("# {}\n{}", s.name, s.chunk);
            if total + section.len() > max_chars {
                break;
            }
            total += section.len() + SEPARATOR_ALLOWANCE;
            selected.push(section);
            if selected.len() >= MAX_EXCERPTS {
                break;
            }
        }

        Ok(selected.join("\n\n---\n\n"))
    }
}
