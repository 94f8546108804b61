mod bootstrap_helpers;
mod cli_args;
mod event_loader;
mod pipeline;

use clap::Parser;

use cli_args::Cli;

#[tokio::main]
async fn main() {
    bootstrap_helpers::init_tracing();
    let cli = Cli::parse();
    if let Err(error) = pipeline::run(cli).await {
        tracing::error!(error = %format!("{error:#}"), "herald run failed");
        std::process::exit(1);
    }
}
