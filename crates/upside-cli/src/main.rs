//! `upside` - terminal communicator
//!
//! Reads commands from stdin, prints screens and signal cues to stdout, logs
//! to stderr.

use std::sync::Arc;

use clap::Parser;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use upside_app::{App, AppConfig, Command, Runtime};
use upside_cli::{Args, TerminalDriver, TerminalError};
use upside_core::env::{Environment, SystemEnv};
use upside_store::MemoryStore;

#[tokio::main]
async fn main() -> Result<(), TerminalError> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let config = args.app_config();

    let env = match args.seed {
        Some(seed) => SystemEnv::seeded(seed),
        None => SystemEnv::new(),
    };

    run(config, args.user, env).await
}

async fn run<E: Environment>(
    config: AppConfig,
    user: Option<String>,
    env: E,
) -> Result<(), TerminalError> {
    info!(collection = %config.feed.collection, mode = %config.initial_mode, "starting");

    let mut app = App::new(config, env);
    let startup = match user {
        Some(user_id) => app.handle(Command::Login { user_id }.into()),
        None => Vec::new(),
    };

    let store = Arc::new(MemoryStore::new());
    let driver = TerminalDriver::new(BufReader::new(tokio::io::stdin()), std::io::stdout());

    let mut runtime = Runtime::new(app, driver, store);
    runtime.queue(startup);
    let (app, _driver) = runtime.run().await?;
    info!(user = app.user().unwrap_or("-"), sanity = app.session().sanity(), "session ended");
    Ok(())
}
