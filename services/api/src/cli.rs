use crate::demo::{run_demo, run_flow_catalog, DemoArgs};
use crate::server;
use bookflow::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Bookflow Orchestrator",
    about = "Run and demonstrate the booking platform's flow orchestrator from the command line",
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
    /// Inspect the flow catalog
    Flows {
        #[command(subcommand)]
        command: FlowsCommand,
    },
    /// Run an end-to-end CLI demo covering the listing and verification flows
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum FlowsCommand {
    /// List every flow with its steps, required markers, and loop rules
    List,
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
        Command::Flows {
            command: FlowsCommand::List,
        } => run_flow_catalog(),
        Command::Demo(args) => run_demo(args),
    }
}
