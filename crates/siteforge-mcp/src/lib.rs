//! SiteForge MCP Server — generate, containerize, and publish static sites
//! over JSON-RPC.

pub mod config;
pub mod protocol;
pub mod session;
pub mod tools;
pub mod transport;
pub mod types;

pub use config::resolve_config;
pub use protocol::ProtocolHandler;
pub use session::PipelineSessionManager;
pub use transport::StdioTransport;
