use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use warmwatch_service::Config;
use warmwatch_service::database::{self, Database};
use warmwatch_service::monitoring::{HttpProber, Prober, Sweep, SweepScheduler};

/// Periodically probes every enabled monitored function
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Config file, created with defaults when missing
    #[arg(short, long, env = "WARMWATCH_CONFIG")]
    config: Option<PathBuf>,

    /// Run a single sweep and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    logger::init_tracing();
    let args = Args::parse();

    let config = Config::from_config(args.config.as_ref())?;
    info!("{}", config);

    let store = Arc::new(database::open(&config.database).await?);
    let database: Arc<dyn Database> = store.clone();
    let prober: Arc<dyn Prober> = Arc::new(HttpProber::new()?);
    let scheduler = SweepScheduler::new(Arc::new(Sweep::new(database, prober)), &config.sweep);

    if args.once {
        if scheduler.run_once().await.is_none() {
            warn!("Sweep did not complete");
        }
    } else {
        info!("Sweeping every {:?}", config.sweep.interval());
        let handle = scheduler.start();
        tokio::signal::ctrl_c().await?;
        info!("Shutting down");
        handle.abort();
    }

    store.close();
    Ok(())
}
