//! Loan applicant risk scoring: feature encoding, model inference, and the
//! HTTP glue that serves both.

pub mod config;
pub mod error;
pub mod scoring;
pub mod telemetry;
