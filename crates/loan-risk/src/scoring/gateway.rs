use std::sync::Arc;

use serde::Serialize;

use super::domain::{EncodedFeatureVector, RiskLabel};

/// Opaque pre-trained capability: ordered numeric rows in, one class index per row out.
pub trait Classifier: Send + Sync {
    fn predict(&self, rows: &[EncodedFeatureVector]) -> Result<Vec<i64>, ClassifierError>;
}

/// Failure reported by a classifier implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClassifierError {
    #[error("classifier unavailable: {0}")]
    Unavailable(String),
}

/// Gateway verdict. `class_index` is `None` when the classifier failed or returned nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub class_index: Option<i64>,
    pub risk: RiskLabel,
}

/// Best-effort wrapper that degrades every classifier anomaly to `RiskLabel::Unknown`.
pub struct InferenceGateway<C> {
    classifier: Arc<C>,
}

impl<C> Clone for InferenceGateway<C> {
    fn clone(&self) -> Self {
        Self {
            classifier: Arc::clone(&self.classifier),
        }
    }
}

impl<C> InferenceGateway<C>
where
    C: Classifier,
{
    pub fn new(classifier: Arc<C>) -> Self {
        Self { classifier }
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    pub fn classify(&self, features: &EncodedFeatureVector) -> Classification {
        let class_index = match self.classifier.predict(std::slice::from_ref(features)) {
            Ok(indices) => indices.first().copied(),
            Err(error) => {
                tracing::warn!(%error, "classifier failed; reporting unknown risk");
                None
            }
        };

        Classification {
            class_index,
            risk: class_index.map_or(RiskLabel::Unknown, RiskLabel::from_class_index),
        }
    }

    pub fn risk(&self, features: &EncodedFeatureVector) -> RiskLabel {
        self.classify(features).risk
    }
}
