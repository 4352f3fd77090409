//! Tool: generate_static_site — Render a static site into a working directory.

use std::sync::Arc;
use tokio::sync::Mutex;

use serde::Deserialize;
use serde_json::{json, Value};

use siteforge::{Archetype, SiteSpec, Theme};

use crate::session::PipelineSessionManager;
use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

const DEFAULT_SITE_NAME: &str = "mysite";

#[derive(Debug, Deserialize)]
struct GenerateParams {
    #[serde(default)]
    site_type: Option<String>,
    #[serde(default)]
    style_hints: Option<StyleHints>,
    #[serde(default)]
    site_name: Option<String>,
}

/// Planning layers send hints either as a single string or a list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StyleHints {
    One(String),
    Many(Vec<String>),
}

impl StyleHints {
    fn into_vec(self) -> Vec<String> {
        match self {
            StyleHints::One(s) => vec![s],
            StyleHints::Many(v) => v,
        }
    }
}

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "generate_static_site".to_string(),
        description: Some(
            "Generate a static site (HTML, CSS, nginx config) into a fresh working directory"
                .to_string(),
        ),
        input_schema: json!({
            "type": "object",
            "properties": {
                "site_type": {
                    "type": "string",
                    "enum": ["portfolio", "landing", "blog", "business"],
                    "description": "Site archetype; unknown values fall back to 'landing'"
                },
                "style_hints": {
                    "description": "Free-text style hints (string or array of strings), e.g. 'dark', 'playful'",
                    "anyOf": [
                        { "type": "string" },
                        { "type": "array", "items": { "type": "string" } }
                    ]
                },
                "site_name": {
                    "type": "string",
                    "description": "Display name for the site",
                    "default": DEFAULT_SITE_NAME
                }
            }
        }),
    }
}

pub async fn execute(
    args: Value,
    session: &Arc<Mutex<PipelineSessionManager>>,
) -> McpResult<ToolCallResult> {
    let params: GenerateParams =
        serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;

    let style_hints = params.style_hints.map(StyleHints::into_vec).unwrap_or_default();
    let spec = SiteSpec {
        archetype: Archetype::parse(params.site_type.as_deref().unwrap_or_default()),
        style_hints,
        name: params
            .site_name
            .unwrap_or_else(|| DEFAULT_SITE_NAME.to_string()),
    };
    let theme = Theme::from_hints(&spec.style_hints);

    let mut session = session.lock().await;
    let site = session.generate(&spec)?;

    Ok(ToolCallResult::json(&json!({
        "site_path": site.root,
        "files": site.files,
        "archetype": spec.archetype.as_str(),
        "theme": theme.name,
        "created_at": site.created_at
    })))
}
