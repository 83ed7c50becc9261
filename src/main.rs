// src/main.rs — DermBench entry point

use clap::Parser;

use dermbench::cli::{Cli, Commands};
use dermbench::infra::config::Config;
use dermbench::infra::logger;

#[tokio::main]
async fn main() {
    // Initialize logging (respects RUST_LOG)
    logger::init_logging("warn");

    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = if let Some(ref path) = cli.config {
        let mut config = Config::load_from(path)?;
        config.apply_env_overrides();
        config
    } else {
        Config::load()?
    };

    match cli.command {
        Commands::Score {
            file,
            retry,
            output,
            model,
        } => dermbench::cli::score::run_score(file, retry, output, model, config).await,
        Commands::Report { file } => dermbench::cli::report::run_report(&file, &config),
    }
}
