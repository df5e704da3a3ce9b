//! rtdl ingester entry point
//!
//! Loads the configuration snapshot, authenticates with Dremio, then serves
//! the `/statefun` surface for the host runtime. Either startup step failing
//! terminates the process.

use clap::Parser;
use rtdl_ingester::catalog::{DremioCatalog, DremioClient};
use rtdl_ingester::config::{ConfigCache, PgConfigStore};
use rtdl_ingester::dispatch::Dispatcher;
use rtdl_ingester::error::{Error, Result};
use rtdl_ingester::server;
use rtdl_ingester::settings::Settings;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "rtdl-ingester", version, about)]
struct Cli {
    /// Port the host runtime dispatches messages to
    #[arg(long, default_value_t = 8082)]
    port: u16,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let settings = Arc::new(Settings::from_env());

    let store = PgConfigStore::connect(&settings.db.connection_string())
        .await
        .map_err(|e| Error::fatal(format!("unable to load configuration: {e}")))?;
    let cache = ConfigCache::load(Arc::new(store))
        .await
        .map_err(|e| Error::fatal(format!("unable to load configuration: {e}")))?;

    let client = DremioClient::new(&settings.dremio)?;
    client
        .login()
        .await
        .map_err(|e| Error::fatal(format!("unable to connect with Dremio: {e}")))?;
    let catalog = DremioCatalog::new(client, settings.dremio_mount_path.clone());

    let dispatcher = Arc::new(Dispatcher::new(
        Arc::new(cache),
        Arc::new(catalog),
        Arc::clone(&settings),
    ));

    server::serve(dispatcher, cli.port).await
}
