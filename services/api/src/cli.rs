use clap::{Args, Parser, Subcommand};

use civet::error::AppError;

use crate::seed::{run_clean, run_seed};
use crate::server;

#[derive(Parser, Debug)]
#[command(
    name = "civet",
    about = "Landing-page builder backend: intake forms, lead scoring, and the lead inbox",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Populate the first owner account's inbox with sample leads
    Seed,
    /// Delete every lead belonging to the first owner account
    Clean,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Run against in-memory storage instead of Directus (demo mode)
    #[arg(long)]
    pub(crate) in_memory: bool,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Seed => run_seed().await,
        Command::Clean => run_clean().await,
    }
}
