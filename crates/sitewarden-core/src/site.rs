//! Static site registry.
//!
//! Sites are plain configuration data resolved by identifier. The registry is
//! immutable at runtime; per-environment overrides are loaded from the CLI
//! config file and passed in at construction.

use serde::{Deserialize, Serialize};

/// Configuration for one monitored site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Stable site identifier, e.g. `"main"`.
    pub id: String,
    /// Base URL without a trailing slash, e.g. `https://example.com`.
    pub base_url: String,
    /// Domains owned by this site, used to classify internal links.
    #[serde(default)]
    pub domains: Vec<String>,
    /// Key page paths fetched for structured-data and rendering checks.
    #[serde(default = "default_key_pages")]
    pub key_pages: Vec<String>,
    /// Paths sampled for CDN cache-hit measurement.
    #[serde(default = "default_cdn_paths")]
    pub cdn_sample_paths: Vec<String>,
}

fn default_key_pages() -> Vec<String> {
    vec!["/".to_string(), "/blog".to_string(), "/about".to_string()]
}

fn default_cdn_paths() -> Vec<String> {
    vec!["/".to_string(), "/blog".to_string(), "/sitemap.xml".to_string()]
}

impl SiteConfig {
    /// Creates a site config with default key pages and CDN sample paths.
    pub fn new(id: impl Into<String>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            id: id.into(),
            base_url,
            domains: Vec::new(),
            key_pages: default_key_pages(),
            cdn_sample_paths: default_cdn_paths(),
        }
    }

    /// Sets the internal-link domains.
    pub fn with_domains(mut self, domains: Vec<String>) -> Self {
        self.domains = domains;
        self
    }

    /// Resolves a path against the site's base URL.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

/// An immutable collection of [`SiteConfig`]s resolved by identifier.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteRegistry {
    sites: Vec<SiteConfig>,
}

impl SiteRegistry {
    /// Creates a registry from a list of sites.
    pub fn new(sites: Vec<SiteConfig>) -> Self {
        Self { sites }
    }

    /// Looks up a site by identifier.
    pub fn get(&self, id: &str) -> Option<&SiteConfig> {
        self.sites.iter().find(|s| s.id == id)
    }

    /// All registered sites.
    pub fn all(&self) -> &[SiteConfig] {
        &self.sites
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_resolution() {
        let site = SiteConfig::new("main", "https://example.com/");
        assert_eq!(site.base_url, "https://example.com");
        assert_eq!(site.url("/sitemap.xml"), "https://example.com/sitemap.xml");
        assert_eq!(site.url("blog"), "https://example.com/blog");
        assert_eq!(site.url("https://other.com/x"), "https://other.com/x");
    }

    #[test]
    fn test_registry_lookup() {
        let registry = SiteRegistry::new(vec![
            SiteConfig::new("a", "https://a.example"),
            SiteConfig::new("b", "https://b.example"),
        ]);
        assert!(registry.get("a").is_some());
        assert!(registry.get("missing").is_none());
        assert_eq!(registry.all().len(), 2);
    }
}
