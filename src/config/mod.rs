//! Site configuration (folio.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub author: String,

    // Content API
    #[serde(default)]
    pub api: ApiConfig,

    // Server
    #[serde(default)]
    pub server: ServerConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "My Blog".to_string(),
            subtitle: String::new(),
            description: "Thoughts, stories, and ideas".to_string(),
            author: "John Doe".to_string(),
            api: ApiConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}

/// Content API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the content API
    pub base_url: String,
    /// Seconds a cached API response stays fresh before re-fetching
    pub revalidate_secs: u64,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            revalidate_secs: 300,
            timeout_secs: 10,
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub ip: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ip: "localhost".to_string(),
            port: 4000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.title, "My Blog");
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.api.revalidate_secs, 300);
        assert_eq!(config.server.port, 4000);
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: Field Notes
author: Test User
api:
  base_url: https://api.example.com
  revalidate_secs: 60
server:
  port: 8080
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "Field Notes");
        assert_eq!(config.api.base_url, "https://api.example.com");
        assert_eq!(config.api.revalidate_secs, 60);
        // Unset fields keep their defaults
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.ip, "localhost");
    }

    #[test]
    fn test_load_from_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "title: Disk Blog\napi:\n  revalidate_secs: 600").unwrap();

        let config = SiteConfig::load(file.path()).unwrap();
        assert_eq!(config.title, "Disk Blog");
        assert_eq!(config.api.revalidate_secs, 600);
    }
}
