mod config;
mod routes;
mod sources;
mod state;

use formats::StaticAssets;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;
use crate::sources::source_for;
use crate::state::{load_corrections, load_map, StartupError};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = ServerConfig::from_env();

    let table = match load_corrections(config.corrections_path.as_deref()) {
        Ok(table) => table,
        Err(err) => {
            error!("{err}");
            std::process::exit(1);
        }
    };
    let assets = match StaticAssets::load(&config.assets_root) {
        Ok(assets) => assets,
        Err(err) => {
            error!("{}", StartupError::Assets(err));
            std::process::exit(1);
        }
    };

    let client = reqwest::Client::new();
    let topology = source_for(&config.topology_source, &client);
    let attributes = source_for(&config.attributes_source, &client);
    let state = match load_map(
        topology.as_ref(),
        attributes.as_ref(),
        &assets,
        &table,
        &config.labels,
    )
    .await
    {
        Ok(state) => state,
        Err(err) => {
            error!("{err}");
            std::process::exit(1);
        }
    };

    let addr = config.addr;
    let app = routes::router(state);
    info!("quiz server listening on http://{addr}");
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("bind {addr} failed: {err}");
            std::process::exit(1);
        }
    };
    if let Err(err) = axum::serve(listener, app).await {
        error!("server error: {err}");
        std::process::exit(1);
    }
}
