//! Tool: containerize_site — Package a generated site as a container image.

use std::sync::Arc;
use tokio::sync::Mutex;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::session::PipelineSessionManager;
use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

const DEFAULT_IMAGE_NAME: &str = "static-site";

#[derive(Debug, Deserialize)]
struct ContainerizeParams {
    site_path: String,
    #[serde(default)]
    image_name: Option<String>,
}

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "containerize_site".to_string(),
        description: Some(
            "Build a container image serving a previously generated site via nginx".to_string(),
        ),
        input_schema: json!({
            "type": "object",
            "properties": {
                "site_path": {
                    "type": "string",
                    "description": "Working directory returned by generate_static_site"
                },
                "image_name": {
                    "type": "string",
                    "description": "Image reference to tag the build with",
                    "default": DEFAULT_IMAGE_NAME
                }
            },
            "required": ["site_path"]
        }),
    }
}

pub async fn execute(
    args: Value,
    session: &Arc<Mutex<PipelineSessionManager>>,
) -> McpResult<ToolCallResult> {
    let params: ContainerizeParams =
        serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;

    let image_name = params
        .image_name
        .unwrap_or_else(|| DEFAULT_IMAGE_NAME.to_string());

    let session = session.lock().await;
    let artifact = session.containerize(&params.site_path, &image_name).await?;

    Ok(ToolCallResult::json(&json!({
        "image_name": artifact.image_name,
        "build_context": artifact.build_context,
        "dockerfile_path": artifact.build_context.join("Dockerfile"),
        "build_log": artifact.log_tail
    })))
}
