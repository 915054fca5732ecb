//! In-memory store adapters
//!
//! Constructed at process start and injected into the coordinator; a
//! durable backend implements the same ports.

pub mod documents;
pub mod threads;
