//! Pipeline coordination: generate, then optionally containerize and
//! publish, collecting partial results instead of aborting.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AgentConfig;
use crate::container::{self, ContainerEngine};
use crate::storage::{self, ObjectStore};
use crate::types::{
    ContainerArtifact, DeploymentResult, SiteResult, SiteSpec, StorageTarget, WorkingSite,
};

/// Deployment half of a pipeline request.
#[derive(Debug, Clone, Deserialize)]
pub struct DeployRequest {
    pub bucket: String,
    /// Falls back to the configured default region when absent.
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default = "default_true")]
    pub create_bucket: bool,
    #[serde(default)]
    pub access_key: Option<String>,
    #[serde(default)]
    pub secret_key: Option<String>,
}

fn default_true() -> bool {
    true
}

/// One end-to-end run. Only generation is mandatory; the later stages run
/// when their parameters are present.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineRequest {
    pub site: SiteSpec,
    #[serde(default)]
    pub image_name: Option<String>,
    #[serde(default)]
    pub deploy: Option<DeployRequest>,
}

/// Where a run currently is. Stages always advance forward; a run never
/// returns to an earlier stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Idle,
    Generating,
    Containerizing,
    Publishing,
    Done,
}

/// A stage that failed, with the error it reported.
#[derive(Debug, Clone, Serialize)]
pub struct StageFailure {
    pub stage: PipelineStage,
    pub error: String,
}

/// Everything a run produced. Stages that did not run or failed leave their
/// slot empty; failures carry the per-stage errors. There is no rollback:
/// whatever completed stays completed.
#[derive(Debug, Serialize)]
pub struct PipelineReport {
    pub run_id: String,
    pub stage: PipelineStage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site: Option<WorkingSite>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ContainerArtifact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment: Option<DeploymentResult>,
    pub failures: Vec<StageFailure>,
}

/// Drives a run through its stages with explicit backends, so tests swap in
/// fakes and production wires the real engine and store.
pub struct Coordinator {
    config: AgentConfig,
    engine: Arc<dyn ContainerEngine>,
    store: Arc<dyn ObjectStore>,
}

impl Coordinator {
    pub fn new(
        config: AgentConfig,
        engine: Arc<dyn ContainerEngine>,
        store: Arc<dyn ObjectStore>,
    ) -> Self {
        Self {
            config,
            engine,
            store,
        }
    }

    /// Execute a run. Generation failure skips the remaining stages since
    /// both depend on the working directory; a containerize failure does not
    /// block publishing and vice versa. The report always reaches `Done`.
    pub async fn run(&self, request: &PipelineRequest) -> PipelineReport {
        let run_id = Uuid::new_v4().to_string();
        let mut report = PipelineReport {
            run_id: run_id.clone(),
            stage: PipelineStage::Idle,
            site: None,
            image: None,
            deployment: None,
            failures: Vec::new(),
        };

        report.stage = PipelineStage::Generating;
        tracing::info!(run_id = %run_id, name = %request.site.name, "pipeline started");
        match crate::generator::generate(&request.site) {
            Ok(site) => report.site = Some(site),
            Err(e) => {
                tracing::warn!(run_id = %run_id, error = %e, "generation failed, skipping remaining stages");
                report.failures.push(StageFailure {
                    stage: PipelineStage::Generating,
                    error: e.to_string(),
                });
                report.stage = PipelineStage::Done;
                return report;
            }
        }
        let site = report.site.clone();

        if let (Some(image_name), Some(site)) = (&request.image_name, &site) {
            report.stage = PipelineStage::Containerizing;
            match container::containerize(site, image_name, self.engine.as_ref()).await {
                Ok(artifact) => report.image = Some(artifact),
                Err(e) => {
                    tracing::warn!(run_id = %run_id, error = %e, "containerize failed");
                    report.failures.push(StageFailure {
                        stage: PipelineStage::Containerizing,
                        error: e.to_string(),
                    });
                }
            }
        }

        if let (Some(deploy), Some(site)) = (&request.deploy, &site) {
            report.stage = PipelineStage::Publishing;
            match self.publish(site, deploy).await {
                Ok(result) => report.deployment = Some(result),
                Err(e) => {
                    tracing::warn!(run_id = %run_id, error = %e, "publish failed");
                    report.failures.push(StageFailure {
                        stage: PipelineStage::Publishing,
                        error: e.to_string(),
                    });
                }
            }
        }

        report.stage = PipelineStage::Done;
        tracing::info!(
            run_id = %run_id,
            failures = report.failures.len(),
            "pipeline finished"
        );
        report
    }

    async fn publish(
        &self,
        site: &WorkingSite,
        deploy: &DeployRequest,
    ) -> SiteResult<DeploymentResult> {
        let credentials = self
            .config
            .credentials(deploy.access_key.as_deref(), deploy.secret_key.as_deref())?;
        let target = StorageTarget {
            bucket: deploy.bucket.clone(),
            region: deploy
                .region
                .clone()
                .unwrap_or_else(|| self.config.default_region.clone()),
            credentials,
        };
        storage::publish(site, &target, deploy.create_bucket, self.store.as_ref()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Archetype, SiteError, StorageTarget};
    use async_trait::async_trait;
    use std::collections::{HashMap, HashSet};
    use std::path::Path;
    use tokio::sync::Mutex;

    struct FakeEngine {
        fail: bool,
    }

    #[async_trait]
    impl ContainerEngine for FakeEngine {
        async fn build(&self, _context: &Path, tag: &str) -> SiteResult<String> {
            if self.fail {
                Err(SiteError::BuildFailure {
                    code: 1,
                    tail: "simulated failure".to_string(),
                })
            } else {
                Ok(format!("Successfully tagged {tag}"))
            }
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        buckets: Mutex<HashSet<String>>,
        objects: Mutex<HashMap<String, Vec<u8>>>,
    }

    #[async_trait]
    impl ObjectStore for MemoryStore {
        async fn bucket_exists(&self, target: &StorageTarget) -> SiteResult<bool> {
            Ok(self.buckets.lock().await.contains(&target.bucket))
        }

        async fn create_bucket(&self, target: &StorageTarget) -> SiteResult<()> {
            self.buckets.lock().await.insert(target.bucket.clone());
            Ok(())
        }

        async fn put_object(
            &self,
            _target: &StorageTarget,
            key: &str,
            body: Vec<u8>,
            _content_type: &str,
        ) -> SiteResult<()> {
            self.objects.lock().await.insert(key.to_string(), body);
            Ok(())
        }
    }

    fn coordinator(engine_fails: bool) -> Coordinator {
        let config = AgentConfig {
            access_key: Some("AK".to_string()),
            secret_key: Some("SK".to_string()),
            ..AgentConfig::default()
        };
        Coordinator::new(
            config,
            Arc::new(FakeEngine {
                fail: engine_fails,
            }),
            Arc::new(MemoryStore::default()),
        )
    }

    fn request(name: &str, image: Option<&str>, bucket: Option<&str>) -> PipelineRequest {
        PipelineRequest {
            site: SiteSpec {
                archetype: Archetype::Blog,
                style_hints: vec!["dark".to_string()],
                name: name.to_string(),
            },
            image_name: image.map(|s| s.to_string()),
            deploy: bucket.map(|b| DeployRequest {
                bucket: b.to_string(),
                region: None,
                create_bucket: true,
                access_key: None,
                secret_key: None,
            }),
        }
    }

    #[tokio::test]
    async fn full_run_produces_all_artifacts() {
        let report = coordinator(false)
            .run(&request("full-run", Some("full-run:v1"), Some("full-run-nyc3")))
            .await;

        assert_eq!(report.stage, PipelineStage::Done);
        assert!(report.failures.is_empty());
        let site = report.site.as_ref().unwrap();
        assert_eq!(report.image.as_ref().unwrap().image_name, "full-run:v1");
        let deployment = report.deployment.as_ref().unwrap();
        assert!(deployment.created_bucket);
        // index.html, styles.css, nginx.conf plus the container descriptor.
        assert_eq!(deployment.uploaded_count, 4);
        assert_eq!(
            deployment.index_url,
            "https://full-run-nyc3.nyc3.digitaloceanspaces.com/index.html"
        );
        std::fs::remove_dir_all(&site.root).unwrap();
    }

    #[tokio::test]
    async fn generation_failure_skips_everything_else() {
        let report = coordinator(false)
            .run(&request("!!!", Some("img"), Some("bucket-nyc3")))
            .await;

        assert_eq!(report.stage, PipelineStage::Done);
        assert!(report.site.is_none());
        assert!(report.image.is_none());
        assert!(report.deployment.is_none());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].stage, PipelineStage::Generating);
    }

    #[tokio::test]
    async fn build_failure_does_not_block_publishing() {
        let report = coordinator(true)
            .run(&request("resilient", Some("resilient:v1"), Some("resilient-nyc3")))
            .await;

        assert!(report.image.is_none());
        assert!(report.deployment.is_some());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].stage, PipelineStage::Containerizing);
        std::fs::remove_dir_all(&report.site.unwrap().root).unwrap();
    }

    #[tokio::test]
    async fn generate_only_request_runs_one_stage() {
        let report = coordinator(false).run(&request("solo", None, None)).await;
        assert!(report.site.is_some());
        assert!(report.image.is_none());
        assert!(report.deployment.is_none());
        assert!(report.failures.is_empty());
        std::fs::remove_dir_all(&report.site.unwrap().root).unwrap();
    }

    #[tokio::test]
    async fn missing_credentials_fail_the_publish_stage_only() {
        let coordinator = Coordinator::new(
            AgentConfig::default(),
            Arc::new(FakeEngine { fail: false }),
            Arc::new(MemoryStore::default()),
        );
        let report = coordinator
            .run(&request("no-creds", None, Some("no-creds-nyc3")))
            .await;

        assert!(report.site.is_some());
        assert!(report.deployment.is_none());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].stage, PipelineStage::Publishing);
        assert!(report.failures[0].error.contains("credentials"));
        std::fs::remove_dir_all(&report.site.unwrap().root).unwrap();
    }
}
