//! Response cache adapters

pub mod memory;
