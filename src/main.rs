//! CLI entry point for draftpress

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use draftpress::Site;

#[derive(Parser)]
#[command(name = "draftpress")]
#[command(version)]
#[command(about = "Create, publish and syndicate MDX blog posts", long_about = None)]
struct Cli {
    /// Set the site directory (defaults to current directory)
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
    /// Create a new draft
    New,

    /// Publish drafts into the content tree
    Publish {
        /// Push the publish commit to the configured remote
        #[arg(long)]
        push: bool,
    },

    /// Mirror post images into the public directory
    SyncImages,

    /// Write the RSS feed
    Feed {
        /// Output file (defaults to <public_dir>/<feed_path>)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List drafts, published posts or tags
    List {
        /// Type of content to list (drafts, published, tags)
        #[arg(default_value = "drafts")]
        r#type: String,
    },

    /// Serve the feed and the public directory
    #[command(alias = "s")]
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "draftpress=debug,info"
    } else {
        "draftpress=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::New => {
            let site = Site::new(&base_dir)?;
            draftpress::commands::new::run(&site)?;
        }

        Commands::Publish { push } => {
            let site = Site::new(&base_dir)?;
            draftpress::commands::publish::run(&site, push)?;
        }

        Commands::SyncImages => {
            let site = Site::new(&base_dir)?;
            draftpress::commands::sync_images::run(&site)?;
        }

        Commands::Feed { output } => {
            let site = Site::new(&base_dir)?;
            draftpress::commands::feed::run(&site, output.as_deref())?;
        }

        Commands::List { r#type } => {
            let site = Site::new(&base_dir)?;
            draftpress::commands::list::run(&site, &r#type)?;
        }

        Commands::Serve { port, ip } => {
            let site = Site::new(&base_dir)?;
            tracing::info!("Starting server at http://{}:{}", ip, port);
            draftpress::server::start(&site, &ip, port).await?;
        }

        Commands::Version => {
            println!("draftpress version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
