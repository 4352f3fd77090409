//! Core data types for the site pipeline.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Structural template category for a generated site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    Portfolio,
    Landing,
    Blog,
    Business,
}

impl Archetype {
    /// Parse free text from the planning layer. Unknown values fall back to
    /// `Landing` — an unrecognized archetype is never an error.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "portfolio" => Archetype::Portfolio,
            "blog" => Archetype::Blog,
            "business" => Archetype::Business,
            _ => Archetype::Landing,
        }
    }

    /// The layout actually rendered. `Business` is an alias that reuses the
    /// landing layout.
    pub fn layout(self) -> Archetype {
        match self {
            Archetype::Business => Archetype::Landing,
            other => other,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Archetype::Portfolio => "portfolio",
            Archetype::Landing => "landing",
            Archetype::Blog => "blog",
            Archetype::Business => "business",
        }
    }
}

/// Parameters for one site generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteSpec {
    pub archetype: Archetype,
    /// Free-text style tokens, in the order the caller gave them.
    pub style_hints: Vec<String>,
    pub name: String,
}

/// Color palette applied to the generated stylesheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Theme {
    pub name: &'static str,
    pub primary: &'static str,
    pub background: &'static str,
    pub text: &'static str,
    pub card: &'static str,
}

impl Theme {
    pub const DARK: Theme = Theme {
        name: "dark",
        primary: "#2563eb",
        background: "#0f172a",
        text: "#f1f5f9",
        card: "#1e293b",
    };

    pub const PLAYFUL: Theme = Theme {
        name: "playful",
        primary: "#ec4899",
        background: "#fef3c7",
        text: "#1f2937",
        card: "#ffffff",
    };

    pub const PROFESSIONAL: Theme = Theme {
        name: "professional",
        primary: "#0369a1",
        background: "#ffffff",
        text: "#1f2937",
        card: "#f8fafc",
    };

    pub const NEUTRAL: Theme = Theme {
        name: "neutral",
        primary: "#3b82f6",
        background: "#ffffff",
        text: "#1f2937",
        card: "#f9fafb",
    };

    /// Select a theme from style hints with fixed precedence:
    /// dark/minimalist > playful/colorful > professional/business > neutral.
    /// Rules are scanned in that order regardless of hint ordering, so a
    /// "dark" keyword always beats a "playful" one.
    pub fn from_hints(hints: &[String]) -> Theme {
        let joined = hints.join(" ").to_lowercase();
        const RULES: &[(&[&str], Theme)] = &[
            (&["dark", "minimal", "minimalist", "modern"], Theme::DARK),
            (&["playful", "colorful", "colourful", "fun", "vibrant"], Theme::PLAYFUL),
            (&["professional", "business", "corporate"], Theme::PROFESSIONAL),
        ];
        for (keywords, theme) in RULES {
            if keywords.iter().any(|k| joined.contains(k)) {
                return *theme;
            }
        }
        Theme::NEUTRAL
    }
}

/// The filesystem staging area holding one generated site.
///
/// Created once by the generator, read by the builder and publisher, never
/// mutated or deleted by the core — external cleanup owns the lifecycle so
/// failed runs stay inspectable.
#[derive(Debug, Clone, Serialize)]
pub struct WorkingSite {
    pub root: PathBuf,
    /// Relative paths of every file under `root`, sorted.
    pub files: Vec<String>,
    /// Unix seconds.
    pub created_at: u64,
}

impl WorkingSite {
    /// Build a view over an existing site directory, re-enumerating its files.
    ///
    /// Used when a tool call hands over a `site_path` produced by an earlier
    /// invocation; picks up anything written since generation (e.g. the
    /// container descriptor).
    pub fn open(root: &Path) -> SiteResult<WorkingSite> {
        if !root.is_dir() {
            return Err(SiteError::Validation(format!(
                "site path {} does not exist or is not a directory",
                root.display()
            )));
        }
        let mut files = Vec::new();
        collect_files(root, root, &mut files)?;
        files.sort();
        let created_at = std::fs::metadata(root)
            .and_then(|m| m.modified())
            .ok()
            .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Ok(WorkingSite {
            root: root.to_path_buf(),
            files,
            created_at,
        })
    }

    pub fn file_path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }
}

fn collect_files(base: &Path, dir: &Path, out: &mut Vec<String>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_files(base, &path, out)?;
        } else if let Ok(rel) = path.strip_prefix(base) {
            out.push(rel.to_string_lossy().replace('\\', "/"));
        }
    }
    Ok(())
}

/// Output of a container build.
#[derive(Debug, Clone, Serialize)]
pub struct ContainerArtifact {
    pub image_name: String,
    pub build_context: PathBuf,
    /// The generated container descriptor content.
    pub dockerfile: String,
    /// Tail of the engine's combined stdout/stderr, for diagnostics.
    pub log_tail: String,
}

/// Storage API credentials, sourced from configuration or per-call overrides.
#[derive(Debug, Clone)]
pub struct StorageCredentials {
    pub access_key: String,
    pub secret_key: String,
}

/// A bucket in an S3-compatible, region-scoped object store.
#[derive(Debug, Clone)]
pub struct StorageTarget {
    pub bucket: String,
    pub region: String,
    pub credentials: StorageCredentials,
}

impl StorageTarget {
    /// Virtual-host style bucket endpoint, DigitalOcean Spaces convention.
    pub fn bucket_host(&self) -> String {
        format!("{}.{}.digitaloceanspaces.com", self.bucket, self.region)
    }

    /// CDN endpoint for the same bucket.
    pub fn cdn_host(&self) -> String {
        format!("{}.{}.cdn.digitaloceanspaces.com", self.bucket, self.region)
    }

    pub fn object_url(&self, key: &str) -> String {
        format!("https://{}/{}", self.bucket_host(), key)
    }

    pub fn cdn_url(&self, key: &str) -> String {
        format!("https://{}/{}", self.cdn_host(), key)
    }
}

/// One object that failed to upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadFailure {
    pub key: String,
    pub error: String,
}

/// Aggregate outcome of one publish. Immutable after construction; partial
/// success is a valid, reported outcome, not a pipeline failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentResult {
    pub index_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cdn_url: Option<String>,
    pub created_bucket: bool,
    pub uploaded_count: usize,
    pub failures: Vec<UploadFailure>,
}

/// Errors that can occur in the site pipeline.
#[derive(thiserror::Error, Debug)]
pub enum SiteError {
    /// Bad input shape or name — caller-fixable, never retried.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid image name: {0}")]
    InvalidImageName(String),

    #[error("Invalid bucket name: {0}")]
    InvalidBucketName(String),

    /// The external container engine is not installed or not runnable.
    /// Distinct from `BuildFailure` — not retryable by rebuilding.
    #[error("Container engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("Container build failed (exit {code}):\n{tail}")]
    BuildFailure { code: i32, tail: String },

    #[error("Container build timed out after {0}s")]
    BuildTimeout(u64),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Bucket unavailable: {0}")]
    BucketUnavailable(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Convenience result type.
pub type SiteResult<T> = Result<T, SiteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn archetype_parse_defaults_to_landing() {
        assert_eq!(Archetype::parse("portfolio"), Archetype::Portfolio);
        assert_eq!(Archetype::parse("BLOG"), Archetype::Blog);
        assert_eq!(Archetype::parse("brochure"), Archetype::Landing);
        assert_eq!(Archetype::parse(""), Archetype::Landing);
    }

    #[test]
    fn business_reuses_landing_layout() {
        assert_eq!(Archetype::Business.layout(), Archetype::Landing);
        assert_eq!(Archetype::Blog.layout(), Archetype::Blog);
    }

    #[test]
    fn theme_precedence_is_fixed() {
        // Dark wins over playful regardless of hint order.
        let hints = vec!["colorful and playful".to_string(), "dark theme".to_string()];
        assert_eq!(Theme::from_hints(&hints), Theme::DARK);
        let reversed = vec!["dark theme".to_string(), "colorful and playful".to_string()];
        assert_eq!(Theme::from_hints(&reversed), Theme::DARK);

        let prof = vec!["professional look".to_string()];
        assert_eq!(Theme::from_hints(&prof), Theme::PROFESSIONAL);

        assert_eq!(Theme::from_hints(&[]), Theme::NEUTRAL);
        assert_eq!(Theme::from_hints(&["sleek".to_string()]), Theme::NEUTRAL);
    }

    #[test]
    fn storage_target_url_convention() {
        let target = StorageTarget {
            bucket: "my-blog-nyc3".to_string(),
            region: "nyc3".to_string(),
            credentials: StorageCredentials {
                access_key: "k".to_string(),
                secret_key: "s".to_string(),
            },
        };
        assert_eq!(
            target.object_url("index.html"),
            "https://my-blog-nyc3.nyc3.digitaloceanspaces.com/index.html"
        );
        assert_eq!(
            target.cdn_url("index.html"),
            "https://my-blog-nyc3.nyc3.cdn.digitaloceanspaces.com/index.html"
        );
    }
}
