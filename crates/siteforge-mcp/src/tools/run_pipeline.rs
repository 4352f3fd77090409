//! Tool: run_site_pipeline — Generate, containerize, and deploy in one call.

use std::sync::Arc;
use tokio::sync::Mutex;

use serde::Deserialize;
use serde_json::{json, Value};

use siteforge::pipeline::{DeployRequest, PipelineRequest};
use siteforge::{Archetype, SiteSpec};

use crate::session::PipelineSessionManager;
use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

#[derive(Debug, Deserialize)]
struct PipelineParams {
    #[serde(default)]
    site_type: Option<String>,
    #[serde(default)]
    style_hints: Option<Vec<String>>,
    #[serde(default)]
    site_name: Option<String>,
    #[serde(default)]
    image_name: Option<String>,
    #[serde(default)]
    bucket_name: Option<String>,
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
        name: "run_site_pipeline".to_string(),
        description: Some(
            "Run the full pipeline: generate a site, then optionally build its container image \
             and publish it to object storage. Stage failures are reported, not raised; the \
             result always includes whatever completed."
                .to_string(),
        ),
        input_schema: json!({
            "type": "object",
            "properties": {
                "site_type": {
                    "type": "string",
                    "enum": ["portfolio", "landing", "blog", "business"]
                },
                "style_hints": {
                    "type": "array",
                    "items": { "type": "string" }
                },
                "site_name": { "type": "string", "default": "mysite" },
                "image_name": {
                    "type": "string",
                    "description": "When present, build a container image with this tag"
                },
                "bucket_name": {
                    "type": "string",
                    "description": "When present, publish the site to this bucket"
                },
                "region": { "type": "string" },
                "access_key": { "type": "string" },
                "secret_key": { "type": "string" },
                "create_bucket_if_missing": { "type": "boolean", "default": true }
            }
        }),
    }
}

pub async fn execute(
    args: Value,
    session: &Arc<Mutex<PipelineSessionManager>>,
) -> McpResult<ToolCallResult> {
    let params: PipelineParams =
        serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;

    let request = PipelineRequest {
        site: SiteSpec {
            archetype: Archetype::parse(params.site_type.as_deref().unwrap_or_default()),
            style_hints: params.style_hints.unwrap_or_default(),
            name: params.site_name.unwrap_or_else(|| "mysite".to_string()),
        },
        image_name: params.image_name,
        deploy: params.bucket_name.map(|bucket| DeployRequest {
            bucket,
            region: params.region,
            create_bucket: params.create_bucket_if_missing,
            access_key: params.access_key,
            secret_key: params.secret_key,
        }),
    };

    let session = session.lock().await;
    let report = session.pipeline(&request).await;

    Ok(ToolCallResult::json(&report))
}
