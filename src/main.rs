//! CLI entry point for folio-rs

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "folio-rs")]
#[command(version = "0.1.0")]
#[command(about = "A blog front-end that renders posts from a REST content API", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the blog
    #[command(alias = "s")]
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// IP address to bind to
        #[arg(short, long)]
        ip: Option<String>,
    },

    /// Render a markdown file to sanitized HTML on stdout
    Render {
        /// Markdown file to render
        file: PathBuf,
    },

    /// List posts available from the content API
    Posts,

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "folio_rs=debug,info"
    } else {
        "folio_rs=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Serve { port, ip } => {
            let folio = folio_rs::Folio::new(&base_dir)?;
            let ip = ip.unwrap_or_else(|| folio.config.server.ip.clone());
            let port = port.unwrap_or(folio.config.server.port);

            tracing::info!("Starting server at http://{}:{}", ip, port);
            folio.serve(&ip, port).await?;
        }

        Commands::Render { file } => {
            let folio = folio_rs::Folio::new(&base_dir)?;
            let markdown = std::fs::read_to_string(&file)?;
            print!("{}", folio.renderer.render(&markdown));
        }

        Commands::Posts => {
            let folio = folio_rs::Folio::new(&base_dir)?;
            tracing::info!("Fetching posts from {}", folio.config.api.base_url);

            let posts = folio.client.fetch_posts().await;
            if posts.is_empty() {
                println!("No posts found.");
            } else {
                for post in &posts {
                    println!("{}  {}  ({})", post.date, post.title, post.slug);
                }
                println!("\n{} post(s)", posts.len());
            }
        }

        Commands::Version => {
            println!("folio-rs version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
