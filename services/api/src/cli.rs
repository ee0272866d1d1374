use crate::demo::{run_demo, run_stages, DemoArgs, StagesArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use party_admission::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Party Admission Tracker",
    about = "Run the admission pipeline service or walk through it from the command line",
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
    /// Print the six admission stages and the dossier checklist
    Stages(StagesArgs),
    /// Walk a sample profile through every stage, into the registry and the notices
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
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Stages(args) => run_stages(args),
        Command::Demo(args) => run_demo(args),
    }
}
