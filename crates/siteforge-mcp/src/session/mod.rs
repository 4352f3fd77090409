//! Session state shared across tool calls.

pub mod manager;

pub use manager::PipelineSessionManager;
