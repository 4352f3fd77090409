//! Object-storage publishing for generated sites.

use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::generator::INDEX_DOCUMENT;
use crate::sign::{self, RequestToSign};
use crate::types::{
    DeploymentResult, SiteError, SiteResult, StorageTarget, UploadFailure, WorkingSite,
};

/// Bounded fan-out for per-object uploads. Ordering across objects carries no
/// semantic meaning; only the aggregate result matters.
const UPLOAD_CONCURRENCY: usize = 8;

const HTTP_TIMEOUT_SECS: u64 = 30;

/// Validate a bucket name against object-storage naming rules: 3–63 chars,
/// lowercase letters, digits, and hyphens, starting and ending with a letter
/// or digit. Checked before any network call.
pub fn validate_bucket_name(name: &str) -> SiteResult<()> {
    if name.len() < 3 || name.len() > 63 {
        return Err(SiteError::InvalidBucketName(format!(
            "'{name}' must be 3-63 characters"
        )));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(SiteError::InvalidBucketName(format!(
            "'{name}' may only contain lowercase letters, digits, and hyphens"
        )));
    }
    let edge_ok = |c: Option<char>| c.is_some_and(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
    if !edge_ok(name.chars().next()) || !edge_ok(name.chars().last()) {
        return Err(SiteError::InvalidBucketName(format!(
            "'{name}' must start and end with a letter or digit"
        )));
    }
    Ok(())
}

/// Regions are short lowercase identifiers like `nyc3` or `ams3`.
pub fn validate_region(region: &str) -> SiteResult<()> {
    if region.is_empty() || !region.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()) {
        return Err(SiteError::Validation(format!(
            "region '{region}' must be a lowercase alphanumeric identifier"
        )));
    }
    Ok(())
}

/// Derive a content type from a file extension so browsers render uploaded
/// assets instead of downloading them.
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" => "application/javascript",
        "json" => "application/json",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "ico" => "image/x-icon",
        "txt" => "text/plain",
        "xml" => "application/xml",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

/// Narrow seam over the storage API; faked in tests, SigV4 over HTTPS in
/// production.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn bucket_exists(&self, target: &StorageTarget) -> SiteResult<bool>;
    async fn create_bucket(&self, target: &StorageTarget) -> SiteResult<()>;
    async fn put_object(
        &self,
        target: &StorageTarget,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> SiteResult<()>;
}

/// S3-compatible client for DigitalOcean Spaces.
pub struct SpacesClient {
    http: reqwest::Client,
}

impl SpacesClient {
    pub fn new() -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();
        Self { http }
    }

    fn signed_headers(
        target: &StorageTarget,
        method: &str,
        path: &str,
        extra: Vec<(String, String)>,
        payload: &[u8],
    ) -> SiteResult<HeaderMap> {
        let req = RequestToSign {
            method,
            host: &target.bucket_host(),
            path,
            headers: extra,
            payload_hash: sign::sha256_hex(payload),
        };
        let signed = sign::sign(
            &req,
            &target.credentials.access_key,
            &target.credentials.secret_key,
            &target.region,
            Utc::now(),
        );

        let mut map = HeaderMap::new();
        for (name, value) in signed {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| SiteError::Storage(format!("invalid header name: {e}")))?;
            let value = HeaderValue::from_str(&value)
                .map_err(|e| SiteError::Storage(format!("invalid header value: {e}")))?;
            map.insert(name, value);
        }
        Ok(map)
    }

    fn map_status(status: reqwest::StatusCode, context: &str) -> SiteError {
        match status.as_u16() {
            401 | 403 => SiteError::Authentication(format!(
                "storage API rejected credentials while {context} (HTTP {status})"
            )),
            _ => SiteError::Storage(format!("{context} failed with HTTP {status}")),
        }
    }
}

impl Default for SpacesClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStore for SpacesClient {
    async fn bucket_exists(&self, target: &StorageTarget) -> SiteResult<bool> {
        let url = format!("https://{}/", target.bucket_host());
        let headers = Self::signed_headers(target, "HEAD", "/", Vec::new(), b"")?;
        let resp = self.http.head(&url).headers(headers).send().await?;
        match resp.status().as_u16() {
            200 => Ok(true),
            404 => Ok(false),
            _ => Err(Self::map_status(resp.status(), "probing bucket")),
        }
    }

    async fn create_bucket(&self, target: &StorageTarget) -> SiteResult<()> {
        let body = format!(
            "<CreateBucketConfiguration><LocationConstraint>{}</LocationConstraint></CreateBucketConfiguration>",
            target.region
        );
        let extra = vec![
            ("content-type".to_string(), "application/xml".to_string()),
            ("x-amz-acl".to_string(), "public-read".to_string()),
        ];
        let headers = Self::signed_headers(target, "PUT", "/", extra, body.as_bytes())?;
        let url = format!("https://{}/", target.bucket_host());
        let resp = self
            .http
            .put(&url)
            .headers(headers)
            .body(body)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(Self::map_status(resp.status(), "creating bucket"));
        }
        // Buckets are created world-readable so objects are servable. Loud on
        // purpose: operators should see the public default.
        tracing::warn!(
            bucket = %target.bucket,
            region = %target.region,
            "created bucket with public-read ACL"
        );
        Ok(())
    }

    async fn put_object(
        &self,
        target: &StorageTarget,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> SiteResult<()> {
        let path = format!("/{key}");
        let extra = vec![
            ("content-type".to_string(), content_type.to_string()),
            ("x-amz-acl".to_string(), "public-read".to_string()),
        ];
        let headers = Self::signed_headers(target, "PUT", &path, extra, &body)?;
        let url = format!("https://{}{}", target.bucket_host(), sign::uri_encode_path(&path));
        let resp = self
            .http
            .put(&url)
            .headers(headers)
            .body(body)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(Self::map_status(resp.status(), "uploading object"));
        }
        Ok(())
    }
}

/// Publish a generated site to object storage.
///
/// Validates names before any request, ensures the bucket exists (creating
/// it when permitted), then uploads every file under the site root with
/// bounded fan-out. Per-object failures are aggregated into the result
/// instead of aborting — partial success is a reported outcome, not an
/// error. Re-publishing the same site overwrites the same keys, so the
/// operation is idempotent.
pub async fn publish(
    site: &WorkingSite,
    target: &StorageTarget,
    create_if_missing: bool,
    store: &dyn ObjectStore,
) -> SiteResult<DeploymentResult> {
    validate_bucket_name(&target.bucket)?;
    validate_region(&target.region)?;
    if target.credentials.access_key.is_empty() || target.credentials.secret_key.is_empty() {
        return Err(SiteError::Authentication(
            "storage credentials are not configured; set SPACES_ACCESS_KEY and SPACES_SECRET_KEY \
             (or AWS_ACCESS_KEY_ID/AWS_SECRET_ACCESS_KEY) or pass them with the request"
                .to_string(),
        ));
    }

    let mut created_bucket = false;
    if !store.bucket_exists(target).await? {
        if !create_if_missing {
            return Err(SiteError::BucketUnavailable(format!(
                "bucket '{}' does not exist and create_bucket_if_missing is false",
                target.bucket
            )));
        }
        store.create_bucket(target).await?;
        created_bucket = true;
    }

    // Re-enumerate from disk so anything written after generation (e.g. the
    // container descriptor) is included.
    let files = WorkingSite::open(&site.root)?.files;
    tracing::info!(
        bucket = %target.bucket,
        count = files.len(),
        "uploading site objects"
    );

    let outcomes: Vec<(String, SiteResult<()>)> = stream::iter(files)
        .map(|key| async move {
            let result = async {
                let bytes = tokio::fs::read(site.file_path(&key)).await?;
                let content_type = content_type_for(Path::new(&key));
                store.put_object(target, &key, bytes, content_type).await
            }
            .await;
            (key, result)
        })
        .buffer_unordered(UPLOAD_CONCURRENCY)
        .collect()
        .await;

    let mut uploaded_count = 0;
    let mut failures = Vec::new();
    for (key, result) in outcomes {
        match result {
            Ok(()) => uploaded_count += 1,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "object upload failed");
                failures.push(UploadFailure {
                    key,
                    error: e.to_string(),
                });
            }
        }
    }
    failures.sort_by(|a, b| a.key.cmp(&b.key));

    tracing::info!(
        bucket = %target.bucket,
        uploaded = uploaded_count,
        failed = failures.len(),
        "publish finished"
    );

    Ok(DeploymentResult {
        index_url: target.object_url(INDEX_DOCUMENT),
        cdn_url: Some(target.cdn_url(INDEX_DOCUMENT)),
        created_bucket,
        uploaded_count,
        failures,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::generate;
    use crate::types::{Archetype, SiteSpec, StorageCredentials};
    use std::collections::{HashMap, HashSet};
    use tokio::sync::Mutex;

    /// In-memory store: a bucket set and a key/value object map, with an
    /// optional set of keys that always fail to upload.
    struct MemoryStore {
        buckets: Mutex<HashSet<String>>,
        objects: Mutex<HashMap<String, Vec<u8>>>,
        fail_keys: HashSet<String>,
    }

    impl MemoryStore {
        fn new() -> Self {
            Self {
                buckets: Mutex::new(HashSet::new()),
                objects: Mutex::new(HashMap::new()),
                fail_keys: HashSet::new(),
            }
        }

        fn failing(keys: &[&str]) -> Self {
            let mut store = Self::new();
            store.fail_keys = keys.iter().map(|k| k.to_string()).collect();
            store
        }
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
            if self.fail_keys.contains(key) {
                return Err(SiteError::Storage(format!("injected failure for {key}")));
            }
            self.objects.lock().await.insert(key.to_string(), body);
            Ok(())
        }
    }

    fn target(bucket: &str) -> StorageTarget {
        StorageTarget {
            bucket: bucket.to_string(),
            region: "nyc3".to_string(),
            credentials: StorageCredentials {
                access_key: "AK".to_string(),
                secret_key: "SK".to_string(),
            },
        }
    }

    fn test_site(name: &str) -> WorkingSite {
        generate(&SiteSpec {
            archetype: Archetype::Blog,
            style_hints: vec!["dark".to_string()],
            name: name.to_string(),
        })
        .unwrap()
    }

    #[test]
    fn bucket_name_rules() {
        assert!(validate_bucket_name("my-blog-nyc3").is_ok());
        assert!(validate_bucket_name("ab").is_err());
        assert!(validate_bucket_name("Has-Upper").is_err());
        assert!(validate_bucket_name("under_score").is_err());
        assert!(validate_bucket_name("-edge").is_err());
        assert!(validate_bucket_name("edge-").is_err());
        assert!(validate_bucket_name(&"x".repeat(64)).is_err());
    }

    #[test]
    fn content_types_from_extension() {
        assert_eq!(content_type_for(Path::new("index.html")), "text/html");
        assert_eq!(content_type_for(Path::new("styles.css")), "text/css");
        assert_eq!(content_type_for(Path::new("a/b/logo.PNG")), "image/png");
        assert_eq!(
            content_type_for(Path::new("nginx.conf")),
            "application/octet-stream"
        );
    }

    #[tokio::test]
    async fn publish_creates_bucket_and_uploads_everything() {
        let site = test_site("pub-one");
        let store = MemoryStore::new();
        let result = publish(&site, &target("pub-one-nyc3"), true, &store)
            .await
            .unwrap();

        assert!(result.created_bucket);
        assert_eq!(result.uploaded_count, 3);
        assert!(result.failures.is_empty());
        assert_eq!(
            result.index_url,
            "https://pub-one-nyc3.nyc3.digitaloceanspaces.com/index.html"
        );
        let objects = store.objects.lock().await;
        let html = std::fs::read(site.file_path("index.html")).unwrap();
        assert_eq!(objects.get("index.html"), Some(&html));
        drop(objects);
        std::fs::remove_dir_all(&site.root).unwrap();
    }

    #[tokio::test]
    async fn missing_bucket_without_create_is_unavailable() {
        let site = test_site("pub-two");
        let store = MemoryStore::new();
        let err = publish(&site, &target("pub-two-nyc3"), false, &store)
            .await
            .unwrap_err();
        assert!(matches!(err, SiteError::BucketUnavailable(_)));
        std::fs::remove_dir_all(&site.root).unwrap();
    }

    #[tokio::test]
    async fn partial_failure_is_reported_not_raised() {
        let site = test_site("pub-three");
        // Pad to five files so one failure leaves four successes.
        std::fs::write(site.file_path("about.html"), "<html>about</html>").unwrap();
        std::fs::write(site.file_path("robots.txt"), "User-agent: *").unwrap();

        let store = MemoryStore::failing(&["about.html"]);
        let result = publish(&site, &target("pub-three-nyc3"), true, &store)
            .await
            .unwrap();

        assert_eq!(result.uploaded_count, 4);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].key, "about.html");
        std::fs::remove_dir_all(&site.root).unwrap();
    }

    #[tokio::test]
    async fn republish_overwrites_the_same_keys() {
        let site = test_site("pub-four");
        let store = MemoryStore::new();
        let tgt = target("pub-four-nyc3");

        let first = publish(&site, &tgt, true, &store).await.unwrap();
        let keys_first: Vec<String> = {
            let mut k: Vec<_> = store.objects.lock().await.keys().cloned().collect();
            k.sort();
            k
        };
        let second = publish(&site, &tgt, true, &store).await.unwrap();
        let keys_second: Vec<String> = {
            let mut k: Vec<_> = store.objects.lock().await.keys().cloned().collect();
            k.sort();
            k
        };

        assert!(first.created_bucket);
        assert!(!second.created_bucket);
        assert_eq!(keys_first, keys_second);
        // Round-trip: stored content after the second publish equals the
        // generated content.
        let css = std::fs::read(site.file_path("styles.css")).unwrap();
        assert_eq!(store.objects.lock().await.get("styles.css"), Some(&css));
        std::fs::remove_dir_all(&site.root).unwrap();
    }

    #[tokio::test]
    async fn absent_credentials_fail_before_any_request() {
        let site = test_site("pub-five");
        let store = MemoryStore::new();
        let mut tgt = target("pub-five-nyc3");
        tgt.credentials.access_key.clear();
        let err = publish(&site, &tgt, true, &store).await.unwrap_err();
        assert!(matches!(err, SiteError::Authentication(_)));
        assert!(store.buckets.lock().await.is_empty());
        std::fs::remove_dir_all(&site.root).unwrap();
    }

    #[tokio::test]
    async fn invalid_bucket_name_fails_before_any_request() {
        let site = test_site("pub-six");
        let store = MemoryStore::new();
        let err = publish(&site, &target("Bad_Bucket"), true, &store)
            .await
            .unwrap_err();
        assert!(matches!(err, SiteError::InvalidBucketName(_)));
        std::fs::remove_dir_all(&site.root).unwrap();
    }
}
