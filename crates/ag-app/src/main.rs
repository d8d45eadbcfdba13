use anyhow::Result;
use clap::Parser;

pub mod cli;
pub mod metadata;
pub mod pipeline;
pub mod play;

fn main() -> Result<()> {
    // 1. Parser CLI
    let cli = cli::Cli::parse();

    // 2. Initialiser le logging
    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Warn))
        .init();

    // 3. Pipeline
    match pipeline::run(&cli)? {
        Some(path) => log::info!("Processing completed : {}", path.display()),
        None => log::info!("Processing completed"),
    }
    Ok(())
}
