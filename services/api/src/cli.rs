use crate::demo::{
    run_batch, run_demo, run_evaluate, run_subsidies, BatchArgs, CatalogArgs, DemoArgs,
    EvaluateArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use forest_subsidy::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Forest Subsidy Eligibility",
    about = "Check forestry projects against subsidy programs and serve the eligibility API",
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
    /// Evaluate one project (JSON file) against a catalogue subsidy
    Evaluate(EvaluateArgs),
    /// Evaluate every project of a CSV file against a catalogue subsidy
    Batch(BatchArgs),
    /// List the subsidy catalogue
    Subsidies(CatalogArgs),
    /// Run the reforestation walkthrough against every catalogue program
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Subsidy catalogue JSON file (overrides SUBSIDY_CATALOG_PATH)
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Evaluate(args) => run_evaluate(args),
        Command::Batch(args) => run_batch(args),
        Command::Subsidies(args) => run_subsidies(args),
        Command::Demo(args) => run_demo(args),
    }
}
