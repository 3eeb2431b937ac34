use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use super::domain::{CategoricalField, InputError, RawApplication, RiskLabel};
use super::encoder::FeatureEncoder;
use super::gateway::{Classifier, InferenceGateway};

/// Scored application returned to HTTP and CLI callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessment {
    pub risk: RiskLabel,
    pub class_index: Option<i64>,
    pub features: Vec<NamedFeature>,
    pub fallback_fields: Vec<CategoricalField>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedFeature {
    pub column: &'static str,
    pub value: f64,
}

/// Counters for silent degradations. They never change a response.
#[derive(Debug, Default)]
struct FallbackCounters {
    predictions: AtomicU64,
    unknown_predictions: AtomicU64,
    categorical: [AtomicU64; 6],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FallbackStats {
    pub predictions: u64,
    pub unknown_predictions: u64,
    pub categorical_fallbacks: Vec<FieldFallbackCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldFallbackCount {
    pub field: CategoricalField,
    pub count: u64,
}

/// Composes the encoder and inference gateway behind a single request entry point.
pub struct RiskScoringService<C> {
    encoder: Arc<FeatureEncoder>,
    gateway: InferenceGateway<C>,
    counters: FallbackCounters,
}

impl<C> RiskScoringService<C>
where
    C: Classifier + 'static,
{
    pub fn new(encoder: Arc<FeatureEncoder>, classifier: Arc<C>) -> Self {
        Self {
            encoder,
            gateway: InferenceGateway::new(classifier),
            counters: FallbackCounters::default(),
        }
    }

    pub fn with_standard_mappings(classifier: Arc<C>) -> Self {
        Self::new(Arc::new(FeatureEncoder::standard()), classifier)
    }

    pub fn classifier(&self) -> &C {
        self.gateway.classifier()
    }

    /// Encode and classify one application. Only input coercion can fail.
    pub fn score(&self, raw: &RawApplication) -> Result<RiskAssessment, InputError> {
        let encoded = self.encoder.encode(raw)?;

        for field in &encoded.fallbacks {
            self.counters.categorical[category_slot(*field)].fetch_add(1, Ordering::Relaxed);
            debug!(field = field.field_name(), "unrecognized category mapped to fallback code");
        }

        let classification = self.gateway.classify(&encoded.features);
        self.counters.predictions.fetch_add(1, Ordering::Relaxed);
        if classification.risk == RiskLabel::Unknown {
            self.counters
                .unknown_predictions
                .fetch_add(1, Ordering::Relaxed);
            debug!(
                class_index = ?classification.class_index,
                "classifier output outside known risk tiers"
            );
        }

        Ok(RiskAssessment {
            risk: classification.risk,
            class_index: classification.class_index,
            features: encoded
                .features
                .named()
                .map(|(column, value)| NamedFeature {
                    column: column.name(),
                    value,
                })
                .collect(),
            fallback_fields: encoded.fallbacks,
        })
    }

    pub fn stats(&self) -> FallbackStats {
        FallbackStats {
            predictions: self.counters.predictions.load(Ordering::Relaxed),
            unknown_predictions: self.counters.unknown_predictions.load(Ordering::Relaxed),
            categorical_fallbacks: CategoricalField::ALL
                .iter()
                .map(|field| FieldFallbackCount {
                    field: *field,
                    count: self.counters.categorical[category_slot(*field)]
                        .load(Ordering::Relaxed),
                })
                .collect(),
        }
    }
}

fn category_slot(field: CategoricalField) -> usize {
    match field {
        CategoricalField::Gender => 0,
        CategoricalField::Education => 1,
        CategoricalField::MaritalStatus => 2,
        CategoricalField::LoanPurpose => 3,
        CategoricalField::EmploymentStatus => 4,
        CategoricalField::PaymentHistory => 5,
    }
}
