//! Loan applicant scoring: feature encoding, inference, and the HTTP surface.
//!
//! Requests flow from the router into [`RiskScoringService`], which runs the
//! [`FeatureEncoder`] and hands the resulting row to an [`InferenceGateway`]
//! wrapping whichever [`Classifier`] was loaded at startup.

pub mod batch;
pub mod domain;
pub mod encoder;
pub mod gateway;
pub mod mapping;
pub mod model;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use batch::{score_csv, BatchError, BatchSummary};
pub use domain::{
    CategoricalField, EncodedFeatureVector, FeatureColumn, InputError, RawApplication, RiskLabel,
    FEATURE_COUNT,
};
pub use encoder::{geo_code, EncodedApplication, FeatureEncoder};
pub use gateway::{Classification, Classifier, ClassifierError, InferenceGateway};
pub use mapping::{CategoricalMapping, CategoricalMappings, CategoryCode};
pub use model::{ForestArtifact, ForestModel, ModelInfo, ModelLoadError};
pub use router::risk_router;
pub use service::{FallbackStats, RiskAssessment, RiskScoringService};
