//! Chat domain: threads, messages, and attached documents

pub mod document;
pub mod entities;
pub mod message;
