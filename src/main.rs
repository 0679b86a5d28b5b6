//! Duckie - ad-hoc SELECT queries against CSV files, in the browser.

use std::sync::Arc;

use duckie::cli::Cli;
use duckie::config::Config;
use duckie::db::DuckDbEngine;
use duckie::error::Result;
use duckie::logging;
use duckie::query::QueryService;
use duckie::web::HttpServer;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse_args();
    logging::init_stderr_logging(cli.log_level.as_deref());

    if let Err(e) = run(cli).await {
        error!("{}: {}", e.category(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    // Load configuration file, then apply CLI overrides
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let mut config = Config::load_from_file(&config_path)?;
    cli.apply_to(&mut config);
    config.validate()?;

    let sources = config.data_sources();
    info!(
        "Serving {} data sources from {}: {}",
        sources.names().len(),
        config.engine.data_dir.display(),
        sources.names().join(", ")
    );

    let engine = Arc::new(DuckDbEngine::new(&config.engine));
    let service = QueryService::new(engine, sources);

    HttpServer::new(config.server.socket_addr()?, service)
        .serve()
        .await
}
