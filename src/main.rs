use anyhow::Result;
use clap::Parser;

use sketch::config::Config;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let config = Config::parse();
    sketch::run(&config)
}
