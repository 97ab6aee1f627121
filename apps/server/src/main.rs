#![warn(clippy::all, clippy::pedantic)]

use std::path::PathBuf;
use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use clap::Parser;
use tracing::info;
use warmwatch_service::{Config, Database, MonitorRegistry, database};

mod error;
mod routes;

use error::AppError;
use logger::init_tracing;

/// HTTP API for registering monitored functions and reading their pings
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Config file, created with defaults when missing
    #[arg(short, long, env = "WARMWATCH_CONFIG")]
    config: Option<PathBuf>,
}

#[actix_web::main]
async fn main() -> Result<(), AppError> {
    init_tracing();
    let args = Args::parse();

    let config_path = args.config.or_else(|| option_env!("WARMWATCH_CONFIG").map(PathBuf::from));
    let config = Config::from_config(config_path.as_ref())?;
    info!("{}", config);

    let store = Arc::new(database::open(&config.database).await?);
    let result = run_server(&config, store.clone()).await;

    store.close();
    result
}

async fn run_server(config: &Config, database: Arc<dyn Database>) -> Result<(), AppError> {
    let registry = web::Data::new(MonitorRegistry::new(database));

    info!("Listening on {}:{}", config.server.bind, config.server.port);
    HttpServer::new(move || {
        App::new()
            .app_data(registry.clone())
            .app_data(routes::json_config())
            .configure(routes::routes)
    })
    .bind((config.server.bind.as_str(), config.server.port))?
    .run()
    .await?;

    Ok(())
}
