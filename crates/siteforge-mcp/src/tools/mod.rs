//! MCP tool implementations.

pub mod containerize_site;
pub mod deploy_storage;
pub mod generate_site;
pub mod registry;
pub mod run_pipeline;

pub use registry::ToolRegistry;
