use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::scoring::domain::{EncodedFeatureVector, FeatureColumn, RawApplication};
use crate::scoring::gateway::{Classifier, ClassifierError};
use crate::scoring::model::{DecisionTree, ForestArtifact, ForestModel, TreeNode};
use crate::scoring::service::RiskScoringService;

/// Reference applicant used throughout the encoder and service tests.
pub(super) fn application() -> RawApplication {
    RawApplication::from_pairs([
        ("age", "35"),
        ("gender", "Female"),
        ("education", "PhD"),
        ("marital_status", "Married"),
        ("income", "75000"),
        ("credit_score", "700"),
        ("loan_amount", "20000"),
        ("loan_purpose", "Home"),
        ("employment_status", "Employed"),
        ("years_at_job", "5"),
        ("payment_history", "Good"),
        ("dti_ratio", "0.3"),
        ("assets_value", "150000"),
        ("dependents", "2"),
        ("city", "Austin"),
        ("state", "Texas"),
        ("country", "USA"),
        ("previous_defaults", "0"),
        ("marital_status_change", "0"),
    ])
}

pub(super) fn application_with(field: &str, value: &str) -> RawApplication {
    let mut raw = application();
    raw.insert(field, value);
    raw
}

pub(super) fn application_without(field: &str) -> RawApplication {
    let mut raw = application();
    raw.remove(field);
    raw
}

/// Always answers with the same class index.
pub(super) struct FixedClassifier(pub(super) i64);

impl Classifier for FixedClassifier {
    fn predict(&self, rows: &[EncodedFeatureVector]) -> Result<Vec<i64>, ClassifierError> {
        Ok(vec![self.0; rows.len()])
    }
}

pub(super) struct FailingClassifier;

impl Classifier for FailingClassifier {
    fn predict(&self, _rows: &[EncodedFeatureVector]) -> Result<Vec<i64>, ClassifierError> {
        Err(ClassifierError::Unavailable("model evicted".to_string()))
    }
}

pub(super) struct EmptyClassifier;

impl Classifier for EmptyClassifier {
    fn predict(&self, _rows: &[EncodedFeatureVector]) -> Result<Vec<i64>, ClassifierError> {
        Ok(Vec::new())
    }
}

/// Records how many rows each call carried.
#[derive(Default)]
pub(super) struct RecordingClassifier {
    pub(super) calls: AtomicUsize,
    pub(super) last_batch: AtomicUsize,
}

impl Classifier for RecordingClassifier {
    fn predict(&self, rows: &[EncodedFeatureVector]) -> Result<Vec<i64>, ClassifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.last_batch.store(rows.len(), Ordering::SeqCst);
        Ok(vec![1; rows.len()])
    }
}

pub(super) fn feature_names() -> Vec<String> {
    FeatureColumn::ALL
        .iter()
        .map(|column| column.name().to_string())
        .collect()
}

/// Credit score at or below 600 is high risk; otherwise any previous default is medium.
pub(super) fn credit_tree() -> DecisionTree {
    DecisionTree {
        nodes: vec![
            TreeNode::Split {
                feature: FeatureColumn::CreditScore.index(),
                threshold: 600.0,
                left: 1,
                right: 2,
            },
            TreeNode::Leaf { class: 2 },
            TreeNode::Split {
                feature: FeatureColumn::PreviousDefaults.index(),
                threshold: 0.0,
                left: 3,
                right: 4,
            },
            TreeNode::Leaf { class: 0 },
            TreeNode::Leaf { class: 1 },
        ],
    }
}

pub(super) fn stump(feature: FeatureColumn, threshold: f64, left: i64, right: i64) -> DecisionTree {
    DecisionTree {
        nodes: vec![
            TreeNode::Split {
                feature: feature.index(),
                threshold,
                left: 1,
                right: 2,
            },
            TreeNode::Leaf { class: left },
            TreeNode::Leaf { class: right },
        ],
    }
}

pub(super) fn artifact(trees: Vec<DecisionTree>) -> ForestArtifact {
    ForestArtifact {
        name: "credit-forest".to_string(),
        feature_names: feature_names(),
        classes: vec![0, 1, 2],
        trees,
    }
}

pub(super) fn credit_forest() -> ForestModel {
    ForestModel::from_artifact(artifact(vec![
        credit_tree(),
        credit_tree(),
        stump(FeatureColumn::DebtToIncomeRatio, 0.45, 0, 1),
    ]))
    .expect("forest validates")
}

pub(super) fn forest_service() -> RiskScoringService<ForestModel> {
    RiskScoringService::with_standard_mappings(Arc::new(credit_forest()))
}

pub(super) fn fixed_service(class_index: i64) -> RiskScoringService<FixedClassifier> {
    RiskScoringService::with_standard_mappings(Arc::new(FixedClassifier(class_index)))
}

pub(super) async fn read_body(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    String::from_utf8(body.to_vec()).expect("utf-8 body")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = read_body(response).await;
    serde_json::from_str(&body).expect("json payload")
}
