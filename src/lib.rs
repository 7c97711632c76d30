//! folio-rs: a blog front-end over a REST content API
//!
//! Fetches post summaries and detail records from the content API and
//! renders them as sanitized HTML pages: a home listing, per-post detail
//! pages, static about/contact pages and a contact-form flow.

pub mod api;
pub mod config;
pub mod content;
pub mod helpers;
pub mod pages;
pub mod server;

use anyhow::Result;
use std::path::Path;

/// The main application: configuration, API client and renderer
pub struct Folio {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Content API client
    pub client: api::ContentClient,
    /// Markdown renderer
    pub renderer: content::MarkdownRenderer,
}

impl Folio {
    /// Create an application from a base directory, reading `folio.yml`
    /// when present and falling back to defaults otherwise
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let config_path = base_dir.as_ref().join("folio.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        Ok(Self::with_config(config))
    }

    /// Create an application from an already-loaded configuration
    pub fn with_config(config: config::SiteConfig) -> Self {
        let client = api::ContentClient::new(&config.api);
        let renderer = content::MarkdownRenderer::new();
        Self {
            config,
            client,
            renderer,
        }
    }

    /// Start the HTTP server
    pub async fn serve(self, ip: &str, port: u16) -> Result<()> {
        server::start(self, ip, port).await
    }
}
