//! Server binary for hosting the Mailcraft email agent over HTTP
//!
//! Loads configuration, constructs the pipeline and its collaborators (the
//! completion client, image search, audit sink, and artifact store), and
//! serves the chat endpoint. Configuration problems, a missing API key above
//! all, are fatal here before any request is accepted, so no model call can
//! ever be attempted without credentials.

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;
use mailcraft_core::audit::{AuditSink, FileAuditSink, NullAuditSink};
use mailcraft_core::llm::OpenAiClient;
use mailcraft_core::store::{ArtifactStore, FileArtifactStore, NullArtifactStore};
use mailcraft_core::tools::image_search::{ImageSearch, NullImageSearch, UnsplashClient};
use mailcraft_core::{MailcraftConfig, Pipeline};
use mailcraft_server::{serve, ServerConfig};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Mailcraft Server - host the email agent pipeline")]
struct Cli {
    #[clap(long, short, default_value = "mailcraft.yaml", help = "Path to the YAML configuration file")]
    config: String,

    #[clap(long, default_value = "127.0.0.1:3001")]
    bind_addr: String,

    #[clap(long, short, default_value = "info")]
    log_level: String,

    #[clap(long, help = "Disable CORS headers on responses")]
    no_cors: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level_filter = cli.log_level.parse().unwrap_or(LevelFilter::Info);
    env_logger::Builder::new()
        .filter_level(log_level_filter)
        .init();

    log::info!("Loading configuration from: {}", cli.config);
    let config = MailcraftConfig::from_file_or_default(&cli.config).await?;
    config.validate()?;

    let base_template = config
        .template
        .load_base_template()
        .await
        .context("base template must be readable at startup")?;
    log::info!(
        "Base template loaded from {} ({} bytes)",
        config.template.path.display(),
        base_template.len()
    );

    let api_key = config.llm.resolved_api_key()?;
    let mut llm = OpenAiClient::new(api_key, config.llm.model.clone())
        .with_temperature(config.llm.temperature)
        .with_max_tokens(config.llm.max_output_tokens)
        .with_request_timeout(Duration::from_secs(config.llm.request_timeout_secs));
    if let Some(api_base) = &config.llm.api_base {
        llm = llm.with_api_base(api_base.clone());
    }

    let images: Arc<dyn ImageSearch> = match config.images.resolved_access_key() {
        Some(access_key) => Arc::new(UnsplashClient::new(access_key)),
        None => {
            log::info!("no image search access key configured, image lookups disabled");
            Arc::new(NullImageSearch)
        }
    };

    let audit: Arc<dyn AuditSink> = if config.audit.enabled {
        Arc::new(FileAuditSink::new(&config.audit.log_file))
    } else {
        Arc::new(NullAuditSink)
    };

    let artifacts: Arc<dyn ArtifactStore> = if config.artifacts.enabled {
        Arc::new(FileArtifactStore::new(&config.artifacts.dir))
    } else {
        Arc::new(NullArtifactStore)
    };

    let pipeline = Arc::new(Pipeline::new(
        Arc::new(llm),
        base_template,
        images,
        artifacts,
        audit,
    ));

    let bind_addr: SocketAddr = cli
        .bind_addr
        .parse()
        .with_context(|| format!("invalid bind address '{}'", cli.bind_addr))?;
    let server_config = ServerConfig {
        bind_addr,
        enable_cors: !cli.no_cors,
        ..ServerConfig::default()
    };

    serve(pipeline, server_config).await
}
