//! Application layer for thinktank
//!
//! This crate contains the reply-coordination use case and the port
//! definitions for external collaborators (model gateway, thread store,
//! document store, response cache). It depends only on the domain layer.

pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use ports::{
    document_store::DocumentStore,
    llm_gateway::{ChatGateway, ChatRequest, GatewayError},
    progress::{NoProgress, ProgressNotifier, TurnPhase},
    response_cache::{Fingerprint, ResponseCache, PROTOCOL_VERSION},
    thread_store::{StoreError, ThreadStore},
};
pub use use_cases::run_turn::{
    RunTurnError, RunTurnInput, RunTurnUseCase, TurnEvent, DEBATE_MAX_TOKENS, DEBATE_MODEL,
};
