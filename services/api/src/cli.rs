use crate::demo::{run_demo, run_optimize, run_recommend, DemoArgs, OptimizeArgs, RecommendArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use card_scout::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Card Scout",
    about = "Recommend credit cards and plan signup-bonus spend from the command line",
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
    /// Rank catalog cards against a set of preferences
    Recommend(RecommendArgs),
    /// Pick the signup bonuses to chase within a spend budget
    Optimize(OptimizeArgs),
    /// Walk through a sample recommendation and spend plan
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
    /// Card catalog CSV to serve instead of the configured one
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
        Command::Recommend(args) => run_recommend(args),
        Command::Optimize(args) => run_optimize(args),
        Command::Demo(args) => run_demo(args),
    }
}
