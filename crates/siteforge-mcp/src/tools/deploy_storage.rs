//! Tool: deploy_to_storage — Publish a generated site to object storage.

use std::sync::Arc;
use tokio::sync::Mutex;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::session::PipelineSessionManager;
use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

#[derive(Debug, Deserialize)]
struct DeployParams {
    site_path: String,
    bucket_name: String,
    #[serde(default)]
    region: Option<String>,
    #[serde(default)]
    access_key: Option<String>,
    #[serde(default)]
    secret_key: Option<String>,
    #[serde(default = "default_true")]
    create_bucket_if_missing: bool,
}

fn default_true() -> bool {
    true
}

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "deploy_to_storage".to_string(),
        description: Some(
            "Upload a generated site to an S3-compatible bucket and return its public URLs"
                .to_string(),
        ),
        input_schema: json!({
            "type": "object",
            "properties": {
                "site_path": {
                    "type": "string",
                    "description": "Working directory returned by generate_static_site"
                },
                "bucket_name": {
                    "type": "string",
                    "description": "Target bucket (3-63 lowercase letters, digits, hyphens)"
                },
                "region": {
                    "type": "string",
                    "description": "Storage region; defaults to the configured region"
                },
                "access_key": {
                    "type": "string",
                    "description": "Per-call credential override"
                },
                "secret_key": {
                    "type": "string",
                    "description": "Per-call credential override"
                },
                "create_bucket_if_missing": {
                    "type": "boolean",
                    "description": "Create the bucket (with public-read ACL) when it does not exist",
                    "default": true
                }
            },
            "required": ["site_path", "bucket_name"]
        }),
    }
}

pub async fn execute(
    args: Value,
    session: &Arc<Mutex<PipelineSessionManager>>,
) -> McpResult<ToolCallResult> {
    let params: DeployParams =
        serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;

    let session = session.lock().await;
    let result = session
        .deploy(
            &params.site_path,
            &params.bucket_name,
            params.region.as_deref(),
            params.access_key.as_deref(),
            params.secret_key.as_deref(),
            params.create_bucket_if_missing,
        )
        .await?;

    Ok(ToolCallResult::json(&json!({
        "index_url": result.index_url,
        "cdn_url": result.cdn_url,
        "created_bucket": result.created_bucket,
        "uploaded_count": result.uploaded_count,
        "failures": result.failures
    })))
}
