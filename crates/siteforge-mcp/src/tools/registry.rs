//! Tool registration and dispatch.

use std::sync::Arc;
use tokio::sync::Mutex;

use serde_json::Value;

use crate::session::PipelineSessionManager;
use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

use super::{containerize_site, deploy_storage, generate_site, run_pipeline};

pub struct ToolRegistry;

impl ToolRegistry {
    pub fn list_tools() -> Vec<ToolDefinition> {
        vec![
            generate_site::definition(),
            containerize_site::definition(),
            deploy_storage::definition(),
            run_pipeline::definition(),
        ]
    }

    pub async fn call(
        name: &str,
        arguments: Option<Value>,
        session: &Arc<Mutex<PipelineSessionManager>>,
    ) -> McpResult<ToolCallResult> {
        let args = arguments.unwrap_or(Value::Object(serde_json::Map::new()));

        match name {
            "generate_static_site" => generate_site::execute(args, session).await,
            "containerize_site" => containerize_site::execute(args, session).await,
            "deploy_to_storage" => deploy_storage::execute(args, session).await,
            "run_site_pipeline" => run_pipeline::execute(args, session).await,
            _ => Err(McpError::ToolNotFound(name.to_string())),
        }
    }
}
