//! This server serves the next ZAKB collections of the configured address as iCalendar feeds.
//!
//! The collections are refreshed in the background, see [`refresh`].
//! `/calendar` serves all collection types, `/calendar/residual`, `/calendar/organic`,
//! `/calendar/paper` and `/calendar/yellow` serve a single one.

use std::{net::SocketAddr, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use zakb_core::config::{Config, DEFAULT_PATH};

use crate::state::AppState;

mod refresh;
mod route;
mod state;

#[derive(Debug, Parser)]
struct Arguments {
    /// the configuration file
    #[arg(long, default_value = DEFAULT_PATH)]
    config: PathBuf,
    /// the address to listen on
    #[arg(long, default_value = "0.0.0.0:8008")]
    bind: SocketAddr,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Arguments::parse();
    let config = Config::load(&args.config)
        .with_context(|| format!("could not load {}", args.config.display()))?;
    let state = AppState::new(args.config, config);
    tokio::spawn(refresh::run(state.clone()));
    let app = route::router(state);
    info!("Listening on {}", args.bind);
    axum::Server::bind(&args.bind)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}
