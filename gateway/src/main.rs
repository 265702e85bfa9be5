//! Ollama Gateway Server Entry Point

use clap::Parser;
use ollama_gateway::cli::{self, Cli, Commands};
use ollama_gateway::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ファイル出力を有効にした場合、ガードはプロセス終了まで保持する
    let _log_guard = logging::init()?;

    let config = cli.load_config()?;

    match &cli.command {
        Some(Commands::Serve(args)) => cli::serve::execute(args, config).await,
        Some(Commands::Models(args)) => cli::models::execute(args, config).await,
        Some(Commands::Pull(args)) => cli::pull::execute(args, config).await,
        // No subcommand - default to serve
        None => cli::serve::execute(&cli::serve::ServeArgs::default(), config).await,
    }
}
