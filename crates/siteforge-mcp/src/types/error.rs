//! Error types and JSON-RPC error codes for the MCP server.

use siteforge::SiteError;

use super::message::{JsonRpcError, JsonRpcErrorObject, RequestId, JSONRPC_VERSION};

/// Standard JSON-RPC 2.0 error codes.
pub mod error_codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
}

/// MCP-specific error codes.
pub mod mcp_error_codes {
    pub const TOOL_NOT_FOUND: i32 = -32803;

    pub const SITE_NOT_FOUND: i32 = -32850;
    pub const VALIDATION: i32 = -32860;
    pub const INVALID_IMAGE_NAME: i32 = -32861;
    pub const INVALID_BUCKET_NAME: i32 = -32862;
    pub const ENGINE_UNAVAILABLE: i32 = -32863;
    pub const BUILD_FAILURE: i32 = -32864;
    pub const BUILD_TIMEOUT: i32 = -32865;
    pub const AUTHENTICATION: i32 = -32866;
    pub const BUCKET_UNAVAILABLE: i32 = -32867;
    pub const STORAGE: i32 = -32868;
}

/// All errors that can occur in the MCP server.
#[derive(thiserror::Error, Debug)]
pub enum McpError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Site not found: {0}")]
    SiteNotFound(String),

    #[error(transparent)]
    Pipeline(#[from] SiteError),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl McpError {
    pub fn code(&self) -> i32 {
        use error_codes::*;
        use mcp_error_codes::*;
        match self {
            McpError::ParseError(_) => PARSE_ERROR,
            McpError::InvalidRequest(_) => INVALID_REQUEST,
            McpError::MethodNotFound(_) => METHOD_NOT_FOUND,
            McpError::InvalidParams(_) => INVALID_PARAMS,
            McpError::InternalError(_) => INTERNAL_ERROR,
            McpError::ToolNotFound(_) => TOOL_NOT_FOUND,
            McpError::SiteNotFound(_) => SITE_NOT_FOUND,
            McpError::Pipeline(e) => match e {
                SiteError::Validation(_) => VALIDATION,
                SiteError::InvalidImageName(_) => INVALID_IMAGE_NAME,
                SiteError::InvalidBucketName(_) => INVALID_BUCKET_NAME,
                SiteError::EngineUnavailable(_) => ENGINE_UNAVAILABLE,
                SiteError::BuildFailure { .. } => BUILD_FAILURE,
                SiteError::BuildTimeout(_) => BUILD_TIMEOUT,
                SiteError::Authentication(_) => AUTHENTICATION,
                SiteError::BucketUnavailable(_) => BUCKET_UNAVAILABLE,
                SiteError::Storage(_) => STORAGE,
                SiteError::Io(_) | SiteError::Http(_) => INTERNAL_ERROR,
            },
            McpError::Transport(_) | McpError::Io(_) => INTERNAL_ERROR,
            McpError::Json(_) => PARSE_ERROR,
        }
    }

    pub fn to_json_rpc_error(&self, id: RequestId) -> JsonRpcError {
        JsonRpcError {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            error: JsonRpcErrorObject {
                code: self.code(),
                message: self.to_string(),
                data: None,
            },
        }
    }
}

pub type McpResult<T> = Result<T, McpError>;
