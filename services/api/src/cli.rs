use crate::commands::{run_batch, run_model_inspect, run_predict, BatchArgs, PredictArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use loan_risk::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Loan Risk Scorer",
    about = "Serve and run loan applicant risk predictions from the command line",
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
    /// Score a single application stored as a JSON object of form fields
    Predict(PredictArgs),
    /// Score every row of a CSV export of form submissions
    Batch(BatchArgs),
    /// Inspect the configured model artifact
    Model {
        #[command(subcommand)]
        command: ModelCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ModelCommand {
    /// Validate the artifact and print its metadata
    Inspect(ModelArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    #[command(flatten)]
    pub(crate) model: ModelArgs,
}

#[derive(Args, Debug, Default, Clone)]
pub(crate) struct ModelArgs {
    /// Model artifact path (defaults to RISK_MODEL_PATH or model/predictor.json)
    #[arg(long = "model")]
    pub(crate) path: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Predict(args) => run_predict(args),
        Command::Batch(args) => run_batch(args),
        Command::Model {
            command: ModelCommand::Inspect(args),
        } => run_model_inspect(args),
    }
}
