mod bridge;
mod command_line;
mod compile;
mod config;
mod contracts;
mod deploy;
mod faucet;
mod scaffold;
mod utils;

use anyhow::Result;
use clap::Parser;
use command_line::CommandLine;
use config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional; RUST_LOG may come from it, so load before the logger
    let dotenv = dotenvy::dotenv();
    env_logger::init();
    match dotenv {
        Ok(path) => log::debug!("loaded {}", path.display()),
        Err(err) if err.not_found() => {}
        Err(err) => log::warn!("ignoring .env: {err}"),
    }

    let config = Config::from_env();
    let cmd = CommandLine::parse();
    cmd.execute(&config).await
}
