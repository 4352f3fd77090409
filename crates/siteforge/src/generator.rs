//! Site materialization — renders templates into a fresh working directory.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::templates;
use crate::types::{SiteError, SiteResult, SiteSpec, Theme, WorkingSite};

/// Name of the entry document every generated site carries.
pub const INDEX_DOCUMENT: &str = "index.html";

const STYLESHEET: &str = "styles.css";
const PROXY_CONFIG: &str = "nginx.conf";

/// Normalize a site name into a filesystem-safe identifier: lowercase,
/// alphanumerics kept, every other run of characters collapsed to a single
/// hyphen, no leading/trailing hyphens.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_sep = false;
    for c in name.trim().chars() {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('-');
            }
            pending_sep = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }
    slug
}

/// Materialize a static site from `spec` into a uniquely named directory.
///
/// Fails with a validation error only when the name is empty after
/// normalization; unrecognized archetypes and style hints never reject.
/// Filesystem writes only — no network I/O. Directories are never reused, so
/// re-invocation with the same spec yields equivalent content at a new root.
pub fn generate(spec: &SiteSpec) -> SiteResult<WorkingSite> {
    let slug = slugify(&spec.name);
    if slug.is_empty() {
        return Err(SiteError::Validation(
            "site name is empty after normalization; provide a name with at least one alphanumeric character".to_string(),
        ));
    }

    let theme = Theme::from_hints(&spec.style_hints);
    tracing::info!(
        archetype = spec.archetype.as_str(),
        theme = theme.name,
        name = %slug,
        "generating site"
    );

    // Random suffix from tempfile keeps concurrent requests collision-free.
    let dir = tempfile::Builder::new()
        .prefix(&format!("static-site-{slug}-"))
        .tempdir()?;
    let root = dir.into_path();

    let display_name = spec.name.trim();
    let rendered = [
        (INDEX_DOCUMENT, templates::render_index(spec.archetype, display_name)),
        (STYLESHEET, templates::render_stylesheet(theme)),
        (PROXY_CONFIG, templates::NGINX_CONF.to_string()),
    ];

    let mut files = Vec::with_capacity(rendered.len());
    for (name, content) in rendered {
        std::fs::write(root.join(name), content)?;
        files.push(name.to_string());
    }
    files.sort();

    let created_at = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    tracing::info!(root = %root.display(), files = files.len(), "site generated");

    Ok(WorkingSite {
        root,
        files,
        created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Archetype;

    fn spec(archetype: Archetype, hints: &[&str], name: &str) -> SiteSpec {
        SiteSpec {
            archetype,
            style_hints: hints.iter().map(|s| s.to_string()).collect(),
            name: name.to_string(),
        }
    }

    #[test]
    fn slugify_normalizes() {
        assert_eq!(slugify("My Blog"), "my-blog");
        assert_eq!(slugify("  Acme, Inc.  "), "acme-inc");
        assert_eq!(slugify("---"), "");
        assert_eq!(slugify("a"), "a");
    }

    #[test]
    fn generate_writes_expected_files() {
        let site = generate(&spec(Archetype::Portfolio, &[], "demo site")).unwrap();
        assert_eq!(
            site.files,
            vec!["index.html", "nginx.conf", "styles.css"]
        );
        for f in &site.files {
            assert!(site.file_path(f).is_file(), "missing {f}");
        }
        let html = std::fs::read_to_string(site.file_path(INDEX_DOCUMENT)).unwrap();
        assert!(html.contains("Portfolio"));
        std::fs::remove_dir_all(&site.root).unwrap();
    }

    #[test]
    fn empty_name_is_rejected() {
        let err = generate(&spec(Archetype::Landing, &[], "   ")).unwrap_err();
        assert!(matches!(err, SiteError::Validation(_)));
        let err = generate(&spec(Archetype::Landing, &[], "!!!")).unwrap_err();
        assert!(matches!(err, SiteError::Validation(_)));
    }

    #[test]
    fn distinct_names_never_share_a_root() {
        let a = generate(&spec(Archetype::Blog, &[], "alpha")).unwrap();
        let b = generate(&spec(Archetype::Blog, &[], "beta")).unwrap();
        assert_ne!(a.root, b.root);
        std::fs::remove_dir_all(&a.root).unwrap();
        std::fs::remove_dir_all(&b.root).unwrap();
    }

    #[test]
    fn same_spec_gets_a_fresh_directory() {
        let s = spec(Archetype::Landing, &["dark"], "repeat");
        let a = generate(&s).unwrap();
        let b = generate(&s).unwrap();
        assert_ne!(a.root, b.root);
        // Functionally equivalent output.
        let css_a = std::fs::read_to_string(a.file_path("styles.css")).unwrap();
        let css_b = std::fs::read_to_string(b.file_path("styles.css")).unwrap();
        assert_eq!(css_a, css_b);
        std::fs::remove_dir_all(&a.root).unwrap();
        std::fs::remove_dir_all(&b.root).unwrap();
    }

    #[test]
    fn dark_hint_wins_in_stylesheet() {
        let site = generate(&spec(
            Archetype::Blog,
            &["playful and colorful", "dark theme"],
            "shade",
        ))
        .unwrap();
        let css = std::fs::read_to_string(site.file_path("styles.css")).unwrap();
        assert!(css.contains("#0f172a"), "dark background expected");
        std::fs::remove_dir_all(&site.root).unwrap();
    }

    #[test]
    fn unknown_archetype_falls_back_to_landing() {
        let site = generate(&spec(Archetype::parse("wiki"), &[], "fallback")).unwrap();
        let html = std::fs::read_to_string(site.file_path(INDEX_DOCUMENT)).unwrap();
        assert!(html.contains("Transform Your Business Today"));
        std::fs::remove_dir_all(&site.root).unwrap();
    }
}
