//! Pipeline backends and per-session state behind the tool surface.

use std::path::Path;
use std::sync::Arc;

use siteforge::pipeline::{Coordinator, PipelineReport, PipelineRequest};
use siteforge::{
    AgentConfig, ContainerArtifact, ContainerEngine, DeploymentResult, DockerEngine, ObjectStore,
    SiteError, SiteSpec, SpacesClient, StorageTarget, WorkingSite,
};

use crate::types::{McpError, McpResult};

/// Owns the configuration and the container/storage backends every tool call
/// runs against. Backends are injected so tests never need a real engine or
/// network.
pub struct PipelineSessionManager {
    config: AgentConfig,
    engine: Arc<dyn ContainerEngine>,
    store: Arc<dyn ObjectStore>,
    generated: Vec<WorkingSite>,
}

impl PipelineSessionManager {
    /// Production wiring: docker CLI and the Spaces HTTP client.
    pub fn new(config: AgentConfig) -> Self {
        let engine = Arc::new(DockerEngine::new(config.build_timeout_secs));
        Self {
            config,
            engine,
            store: Arc::new(SpacesClient::new()),
            generated: Vec::new(),
        }
    }

    /// Explicit backends. Test hook.
    pub fn with_backends(
        config: AgentConfig,
        engine: Arc<dyn ContainerEngine>,
        store: Arc<dyn ObjectStore>,
    ) -> Self {
        Self {
            config,
            engine,
            store,
            generated: Vec::new(),
        }
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Sites generated through this session, oldest first.
    pub fn generated_sites(&self) -> &[WorkingSite] {
        &self.generated
    }

    pub fn generate(&mut self, spec: &SiteSpec) -> McpResult<WorkingSite> {
        let site = siteforge::generate(spec)?;
        self.generated.push(site.clone());
        Ok(site)
    }

    /// Resolve a `site_path` handed back by an earlier tool call. A missing
    /// directory is a distinct, caller-fixable error. The directory is
    /// re-enumerated even for sites generated this session, since the
    /// builder may have written files after generation.
    pub fn resolve_site(&self, site_path: &str) -> McpResult<WorkingSite> {
        let root = Path::new(site_path);
        if self.generated.iter().any(|s| s.root == root) {
            tracing::debug!(path = site_path, "site was generated this session");
        }
        WorkingSite::open(root).map_err(|e| match e {
            SiteError::Validation(_) => McpError::SiteNotFound(site_path.to_string()),
            other => McpError::Pipeline(other),
        })
    }

    pub async fn containerize(
        &self,
        site_path: &str,
        image_name: &str,
    ) -> McpResult<ContainerArtifact> {
        let site = self.resolve_site(site_path)?;
        Ok(siteforge::containerize(&site, image_name, self.engine.as_ref()).await?)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn deploy(
        &self,
        site_path: &str,
        bucket: &str,
        region: Option<&str>,
        access_key: Option<&str>,
        secret_key: Option<&str>,
        create_if_missing: bool,
    ) -> McpResult<DeploymentResult> {
        let site = self.resolve_site(site_path)?;
        let credentials = self.config.credentials(access_key, secret_key)?;
        let target = StorageTarget {
            bucket: bucket.to_string(),
            region: region
                .map(|r| r.to_string())
                .unwrap_or_else(|| self.config.default_region.clone()),
            credentials,
        };
        Ok(siteforge::publish(&site, &target, create_if_missing, self.store.as_ref()).await?)
    }

    pub async fn pipeline(&self, request: &PipelineRequest) -> PipelineReport {
        let coordinator = Coordinator::new(
            self.config.clone(),
            Arc::clone(&self.engine),
            Arc::clone(&self.store),
        );
        coordinator.run(request).await
    }
}
