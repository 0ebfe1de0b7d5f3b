use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;

fn main() {
    // Diagnostics are printed by the commands; RUST_LOG opts into library logs.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    cli::run(cli::Cli::parse());
}
