//! Prompt templates for the group chat flow

pub mod template;

pub use template::ChatPromptTemplate;
