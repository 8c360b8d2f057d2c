//! Curation tracer server entry point.
//!
//! Run with: `curation-tracer --config tracer.json`

use clap::Parser;
use std::path::PathBuf;
use tracer_core::{init_logging, TracerConfig};

#[derive(Debug, Parser)]
#[command(name = "curation-tracer", version, about = "IIIF curation backlink tracer")]
struct Cli {
    /// JSON configuration file.
    #[arg(long, env = "TRACER_CONFIG", default_value = "tracer.json")]
    config: PathBuf,

    /// Overrides `port` from the configuration file.
    #[arg(long, env = "TRACER_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut config = TracerConfig::load(&cli.config)?;
    if let Some(port) = cli.port {
        config.port = port;
    }

    init_logging(&config.log_level, config.log_dir.as_deref())?;
    tracer_server::serve(config).await
}
