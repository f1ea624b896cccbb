use arbiter::{cli, config::Config};
use clap::Parser;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = Config::parse();

    cli::run(config)
}
