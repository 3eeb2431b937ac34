use crate::cli::ModelArgs;
use crate::infra::{load_model, resolve_model_path, scoring_service};
use chrono::Utc;
use clap::Args;
use loan_risk::error::AppError;
use loan_risk::scoring::router::raw_from_json;
use loan_risk::scoring::{score_csv, BatchSummary};
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct PredictArgs {
    /// JSON file holding one object of form field names to values
    #[arg(long)]
    pub(crate) input: PathBuf,
    #[command(flatten)]
    pub(crate) model: ModelArgs,
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// CSV file with a header row of form field names
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Destination CSV (defaults to stdout)
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    #[command(flatten)]
    pub(crate) model: ModelArgs,
}

pub(crate) fn run_predict(args: PredictArgs) -> Result<(), AppError> {
    let PredictArgs { input, model } = args;

    let model = load_model(&resolve_model_path(&model)?)?;
    let service = scoring_service(model);

    let payload: Map<String, Value> = serde_json::from_reader(BufReader::new(File::open(input)?))?;
    let raw = raw_from_json(payload)?;
    let assessment = service.score(&raw)?;

    println!("Predicted loan risk: {}", assessment.risk);
    if !assessment.fallback_fields.is_empty() {
        let fields: Vec<&str> = assessment
            .fallback_fields
            .iter()
            .map(|field| field.field_name())
            .collect();
        println!("Unrecognized categories (fallback codes used): {}", fields.join(", "));
    }
    println!("{}", serde_json::to_string_pretty(&assessment)?);

    Ok(())
}

pub(crate) fn run_batch(args: BatchArgs) -> Result<(), AppError> {
    let BatchArgs {
        input,
        output,
        model,
    } = args;

    let model = load_model(&resolve_model_path(&model)?)?;
    let service = scoring_service(model);
    let reader = BufReader::new(File::open(&input)?);

    let started = Utc::now();
    let summary = match output {
        Some(path) => score_csv(&service, reader, BufWriter::new(File::create(path)?))?,
        None => score_csv(&service, reader, io::stdout().lock())?,
    };
    let elapsed = Utc::now() - started;

    render_batch_summary(&summary, elapsed.num_milliseconds());
    Ok(())
}

pub(crate) fn run_model_inspect(args: ModelArgs) -> Result<(), AppError> {
    let path = resolve_model_path(&args)?;
    let model = load_model(&path)?;
    let info = model.info();

    println!("Model: {}", info.name);
    println!("Artifact: {}", path.display());
    println!(
        "Trees: {} (max depth {}) | classes {:?}",
        info.tree_count, info.max_depth, info.classes
    );
    println!("Feature order:");
    for (position, name) in info.feature_names.iter().enumerate() {
        println!("  {:>2}. {}", position, name);
    }

    Ok(())
}

/// Summary goes to stderr so stdout stays a clean CSV stream.
fn render_batch_summary(summary: &BatchSummary, elapsed_ms: i64) {
    eprintln!(
        "Scored {} of {} rows in {} ms ({} rejected)",
        summary.scored, summary.rows, elapsed_ms, summary.rejected
    );
    for (risk, count) in &summary.risk_counts {
        eprintln!("- {risk}: {count}");
    }
}
