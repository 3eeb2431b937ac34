use std::collections::BTreeMap;
use std::io::{Read, Write};

use serde::Serialize;

use super::domain::RawApplication;
use super::gateway::Classifier;
use super::service::RiskScoringService;

/// Label written for rows rejected by input validation.
pub const REJECTED_LABEL: &str = "Error";

#[derive(Debug, Serialize)]
struct BatchRow {
    row: usize,
    risk: String,
    class_index: Option<i64>,
    error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub rows: usize,
    pub scored: usize,
    pub rejected: usize,
    pub risk_counts: BTreeMap<String, usize>,
}

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("invalid applications CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to write batch results: {0}")]
    Io(#[from] std::io::Error),
}

/// Scores every row of a headered CSV of raw form fields. Bad rows are reported
/// inline and do not stop the batch.
pub fn score_csv<C, R, W>(
    service: &RiskScoringService<C>,
    input: R,
    output: W,
) -> Result<BatchSummary, BatchError>
where
    C: Classifier + 'static,
    R: Read,
    W: Write,
{
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_reader(input);
    let headers = reader.headers()?.clone();
    let mut writer = csv::Writer::from_writer(output);
    let mut summary = BatchSummary::default();

    for (index, record) in reader.records().enumerate() {
        let record = record?;
        let raw = RawApplication::from_pairs(headers.iter().zip(record.iter()));
        let row = index + 1;
        summary.rows += 1;

        let line = match service.score(&raw) {
            Ok(assessment) => {
                summary.scored += 1;
                *summary
                    .risk_counts
                    .entry(assessment.risk.label().to_string())
                    .or_default() += 1;
                BatchRow {
                    row,
                    risk: assessment.risk.label().to_string(),
                    class_index: assessment.class_index,
                    error: String::new(),
                }
            }
            Err(error) => {
                summary.rejected += 1;
                BatchRow {
                    row,
                    risk: REJECTED_LABEL.to_string(),
                    class_index: None,
                    error: error.to_string(),
                }
            }
        };
        writer.serialize(line)?;
    }

    writer.flush()?;
    Ok(summary)
}
