mod expand;
mod report;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt, util::SubscriberInitExt};

/// Runs the `turbo_cow` value expansion on source files, without a compiler. Useful to look at
/// generated code and at which capabilities were synthesized or left to hand-written impls.
#[derive(Parser)]
#[command(name = "turbo-cow", version)]
struct Cli {
    /// Log filter, in `tracing_subscriber::EnvFilter` syntax. Logs go to stderr.
    #[arg(long, global = true, env = "TURBO_COW_LOG", default_value = "warn")]
    log: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Expands every value declaration in a Rust source file.
    Expand(expand::Expand),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    Registry::default()
        .with(EnvFilter::try_new(&cli.log)?)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Expand(args) => expand::run(args),
    }
}
