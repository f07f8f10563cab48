//! Book Exchange login shim
//!
//! Serves the legacy `POST /login` endpoint from a local user directory.

use std::path::PathBuf;

use bookexchange::{models::Config, shim};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "bookexchange-shim", version, about = "Legacy login endpoint")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "bookexchange.toml")]
    config: PathBuf,

    /// Override the bind address
    #[arg(short, long)]
    bind: Option<String>,
}

#[actix_web::main]
async fn main() -> bookexchange::error::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let cli = Cli::parse();
    let mut config = Config::load_or_default(&cli.config);
    if let Some(bind) = cli.bind {
        config.shim.bind = bind;
    }
    config.validate()?;

    log::info!("Book Exchange login shim starting...");
    shim::run(&config.shim).await
}
