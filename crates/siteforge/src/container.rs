//! Container image builds over an external engine subprocess.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

use crate::templates;
use crate::types::{ContainerArtifact, SiteError, SiteResult, WorkingSite};

/// Default build timeout, matching the engine's typical cold-cache build time
/// for a small static site with generous headroom.
pub const DEFAULT_BUILD_TIMEOUT_SECS: u64 = 300;

/// How many trailing log lines to keep for diagnostics.
const LOG_TAIL_LINES: usize = 40;

/// Validate and normalize a container image reference. Rejected before any
/// subprocess is spawned — the engine never sees an illegal name.
pub fn validate_image_name(name: &str) -> SiteResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(SiteError::InvalidImageName(
            "image name must not be empty".to_string(),
        ));
    }
    if name.chars().any(|c| c.is_whitespace()) {
        return Err(SiteError::InvalidImageName(format!(
            "'{name}' contains whitespace"
        )));
    }
    if name.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(SiteError::InvalidImageName(format!(
            "'{name}' contains uppercase letters; image references are lowercase"
        )));
    }
    let valid = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit() || "._-/:".contains(c);
    if !name.chars().all(valid) {
        return Err(SiteError::InvalidImageName(format!(
            "'{name}' contains characters outside [a-z0-9._/:-]"
        )));
    }
    if !name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
    {
        return Err(SiteError::InvalidImageName(format!(
            "'{name}' must start with a lowercase letter or digit"
        )));
    }
    if name.matches(':').count() > 1 {
        return Err(SiteError::InvalidImageName(format!(
            "'{name}' has more than one tag separator"
        )));
    }
    Ok(name.to_string())
}

/// Narrow seam over the external build engine so tests can run without a
/// real engine installed.
#[async_trait]
pub trait ContainerEngine: Send + Sync {
    /// Build an image from `context`, tagged `tag`. Returns the engine's
    /// combined output on success.
    async fn build(&self, context: &Path, tag: &str) -> SiteResult<String>;
}

/// Production engine: shells out to the `docker` CLI.
pub struct DockerEngine {
    program: String,
    timeout: Duration,
}

impl DockerEngine {
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            program: "docker".to_string(),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Override the engine binary. Test hook.
    pub fn with_program(program: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            program: program.into(),
            timeout: Duration::from_secs(timeout_secs),
        }
    }
}

#[async_trait]
impl ContainerEngine for DockerEngine {
    async fn build(&self, context: &Path, tag: &str) -> SiteResult<String> {
        tracing::info!(tag, context = %context.display(), "starting container build");

        let mut child = Command::new(&self.program)
            .args(["build", "-t", tag, "."])
            .current_dir(context)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
                    SiteError::EngineUnavailable(format!(
                        "'{}' could not be started: {e}. Ensure the container engine is installed and on PATH",
                        self.program
                    ))
                }
                _ => SiteError::Io(e),
            })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let stdout_task = tokio::spawn(async move {
            let mut lines_out = Vec::new();
            if let Some(stdout) = stdout {
                let mut lines = BufReader::new(stdout).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    lines_out.push(line);
                }
            }
            lines_out
        });
        let stderr_task = tokio::spawn(async move {
            let mut lines_out = Vec::new();
            if let Some(stderr) = stderr {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    lines_out.push(line);
                }
            }
            lines_out
        });

        let status = tokio::select! {
            _ = tokio::time::sleep(self.timeout) => {
                tracing::error!(tag, timeout_secs = self.timeout.as_secs(), "build timed out, killing engine");
                let _ = child.kill().await;
                let _ = child.wait().await;
                stdout_task.abort();
                stderr_task.abort();
                return Err(SiteError::BuildTimeout(self.timeout.as_secs()));
            }
            status = child.wait() => status.map_err(SiteError::Io)?,
        };

        let mut output = stdout_task.await.unwrap_or_default();
        output.extend(stderr_task.await.unwrap_or_default());
        let combined = output.join("\n");

        if status.success() {
            tracing::info!(tag, "container build succeeded");
            Ok(combined)
        } else {
            let code = status.code().unwrap_or(-1);
            let tail = tail_lines(&combined, LOG_TAIL_LINES);
            tracing::error!(tag, code, "container build failed");
            Err(SiteError::BuildFailure { code, tail })
        }
    }
}

fn tail_lines(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].join("\n")
}

/// Build a container image for a generated site.
///
/// Validates the image name, writes the deterministic container descriptor
/// into the site root, then invokes the engine with the root as build
/// context. Build failures are not retried — they are deterministic for the
/// same inputs.
pub async fn containerize(
    site: &WorkingSite,
    image_name: &str,
    engine: &dyn ContainerEngine,
) -> SiteResult<ContainerArtifact> {
    let image_name = validate_image_name(image_name)?;

    let dockerfile_path = site.file_path("Dockerfile");
    std::fs::write(&dockerfile_path, templates::DOCKERFILE)?;
    tracing::debug!(path = %dockerfile_path.display(), "wrote container descriptor");

    let log = engine.build(&site.root, &image_name).await?;

    Ok(ContainerArtifact {
        image_name,
        build_context: site.root.clone(),
        dockerfile: templates::DOCKERFILE.to_string(),
        log_tail: tail_lines(&log, LOG_TAIL_LINES),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::generate;
    use crate::types::{Archetype, SiteSpec};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingEngine {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ContainerEngine for CountingEngine {
        async fn build(&self, _context: &Path, tag: &str) -> SiteResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("Successfully tagged {tag}"))
        }
    }

    fn test_site() -> WorkingSite {
        generate(&SiteSpec {
            archetype: Archetype::Landing,
            style_hints: vec![],
            name: "engine-test".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn image_name_rules() {
        assert!(validate_image_name("my-blog").is_ok());
        assert!(validate_image_name("registry.io/team/site:v1").is_ok());
        assert!(matches!(
            validate_image_name("My-Blog"),
            Err(SiteError::InvalidImageName(_))
        ));
        assert!(matches!(
            validate_image_name("my blog"),
            Err(SiteError::InvalidImageName(_))
        ));
        assert!(matches!(
            validate_image_name(""),
            Err(SiteError::InvalidImageName(_))
        ));
        assert!(matches!(
            validate_image_name("-leading"),
            Err(SiteError::InvalidImageName(_))
        ));
        assert!(matches!(
            validate_image_name("a:b:c"),
            Err(SiteError::InvalidImageName(_))
        ));
    }

    #[tokio::test]
    async fn invalid_name_never_reaches_the_engine() {
        let site = test_site();
        let engine = CountingEngine {
            calls: AtomicUsize::new(0),
        };
        let err = containerize(&site, "Bad Name", &engine).await.unwrap_err();
        assert!(matches!(err, SiteError::InvalidImageName(_)));
        assert_eq!(engine.calls.load(Ordering::SeqCst), 0);
        std::fs::remove_dir_all(&site.root).unwrap();
    }

    #[tokio::test]
    async fn containerize_writes_descriptor_and_builds() {
        let site = test_site();
        let engine = CountingEngine {
            calls: AtomicUsize::new(0),
        };
        let artifact = containerize(&site, "engine-test", &engine).await.unwrap();
        assert_eq!(artifact.image_name, "engine-test");
        assert_eq!(engine.calls.load(Ordering::SeqCst), 1);
        let written = std::fs::read_to_string(site.file_path("Dockerfile")).unwrap();
        assert_eq!(written, templates::DOCKERFILE);
        assert!(artifact.log_tail.contains("Successfully tagged"));
        std::fs::remove_dir_all(&site.root).unwrap();
    }

    #[tokio::test]
    async fn missing_engine_is_a_distinct_error() {
        let site = test_site();
        let engine = DockerEngine::with_program("siteforge-no-such-engine-12345", 5);
        let err = engine.build(&site.root, "x").await.unwrap_err();
        assert!(matches!(err, SiteError::EngineUnavailable(_)));
        std::fs::remove_dir_all(&site.root).unwrap();
    }

    #[tokio::test]
    async fn nonzero_exit_surfaces_as_build_failure() {
        let site = test_site();
        // `false build -t x .` exits non-zero without doing anything.
        let engine = DockerEngine::with_program("false", 5);
        let err = engine.build(&site.root, "x").await.unwrap_err();
        assert!(matches!(err, SiteError::BuildFailure { .. }));
        std::fs::remove_dir_all(&site.root).unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn timeout_kills_a_hung_build() {
        use std::os::unix::fs::PermissionsExt;

        let site = test_site();
        // Stand-in engine that ignores its arguments and hangs.
        let script = site.file_path("hang.sh");
        std::fs::write(&script, "#!/bin/sh\nsleep 30\n").unwrap();
        let mut perms = std::fs::metadata(&script).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&script, perms).unwrap();

        let engine = DockerEngine::with_program(script.to_string_lossy().into_owned(), 1);
        let start = std::time::Instant::now();
        let err = engine.build(&site.root, "x").await.unwrap_err();
        assert!(matches!(err, SiteError::BuildTimeout(1)));
        // The subprocess is killed rather than waited out.
        assert!(start.elapsed() < Duration::from_secs(10));
        std::fs::remove_dir_all(&site.root).unwrap();
    }

    #[test]
    fn tail_keeps_last_lines() {
        let text = (0..100).map(|i| i.to_string()).collect::<Vec<_>>().join("\n");
        let tail = tail_lines(&text, 3);
        assert_eq!(tail, "97\n98\n99");
    }
}
