//! Decision-forest classifier deserialized from a JSON artifact.
//!
//! The artifact declares its input columns by name; loading fails unless they match
//! [`FeatureColumn::ALL`] exactly, so a reordered export can never be served.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{EncodedFeatureVector, FeatureColumn, FEATURE_COUNT};
use super::gateway::{Classifier, ClassifierError};

/// One node of a flattened tree. Node 0 is the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        class: i64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// `x[feature] <= threshold` goes left; a value missing from a short row goes right.
    /// Validation guarantees children follow their parent, so the walk always terminates.
    pub fn predict(&self, row: &[f64]) -> i64 {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                TreeNode::Leaf { class } => return *class,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = row.get(*feature).copied().unwrap_or(f64::NAN);
                    index = if value <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[TreeNode], index: usize) -> usize {
            match &nodes[index] {
                TreeNode::Leaf { .. } => 1,
                TreeNode::Split { left, right, .. } => {
                    1 + walk(nodes, *left).max(walk(nodes, *right))
                }
            }
        }
        walk(&self.nodes, 0)
    }

    fn validate(&self, tree: usize) -> Result<(), ModelLoadError> {
        if self.nodes.is_empty() {
            return Err(ModelLoadError::EmptyTree { tree });
        }

        for (node, entry) in self.nodes.iter().enumerate() {
            if let TreeNode::Split {
                feature,
                left,
                right,
                ..
            } = entry
            {
                if *feature >= FEATURE_COUNT {
                    return Err(ModelLoadError::FeatureOutOfRange {
                        tree,
                        node,
                        feature: *feature,
                    });
                }
                for child in [*left, *right] {
                    if child <= node || child >= self.nodes.len() {
                        return Err(ModelLoadError::InvalidChild { tree, node, child });
                    }
                }
            }
        }

        Ok(())
    }
}

/// Serialized form of the forest as written by the export tooling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestArtifact {
    pub name: String,
    pub feature_names: Vec<String>,
    #[serde(default)]
    pub classes: Vec<i64>,
    pub trees: Vec<DecisionTree>,
}

/// Validated forest ready to serve predictions.
#[derive(Debug, Clone)]
pub struct ForestModel {
    artifact: ForestArtifact,
    source: Option<PathBuf>,
    loaded_at: DateTime<Utc>,
}

impl ForestModel {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ModelLoadError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ModelLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut model = Self::from_reader(BufReader::new(file))?;
        model.source = Some(path.to_path_buf());
        Ok(model)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ModelLoadError> {
        let artifact: ForestArtifact = serde_json::from_reader(reader)?;
        Self::from_artifact(artifact)
    }

    pub fn from_artifact(artifact: ForestArtifact) -> Result<Self, ModelLoadError> {
        let expected: Vec<&str> = FeatureColumn::ALL.iter().map(|c| c.name()).collect();
        if artifact.feature_names.len() != expected.len()
            || artifact
                .feature_names
                .iter()
                .zip(&expected)
                .any(|(declared, wanted)| declared != wanted)
        {
            return Err(ModelLoadError::FeatureOrderMismatch {
                declared: artifact.feature_names.clone(),
            });
        }

        if artifact.trees.is_empty() {
            return Err(ModelLoadError::EmptyForest);
        }
        for (tree, entry) in artifact.trees.iter().enumerate() {
            entry.validate(tree)?;
        }

        Ok(Self {
            artifact,
            source: None,
            loaded_at: Utc::now(),
        })
    }

    /// Majority vote across trees; ties go to the smallest class index.
    pub fn predict_row(&self, row: &[f64]) -> i64 {
        let mut votes: BTreeMap<i64, usize> = BTreeMap::new();
        for tree in &self.artifact.trees {
            *votes.entry(tree.predict(row)).or_default() += 1;
        }

        let mut winner = (0, 0);
        for (class, count) in votes {
            if count > winner.1 {
                winner = (class, count);
            }
        }
        winner.0
    }

    pub fn info(&self) -> ModelInfo {
        let mut classes = self.artifact.classes.clone();
        if classes.is_empty() {
            classes = self
                .artifact
                .trees
                .iter()
                .flat_map(|tree| tree.nodes.iter())
                .filter_map(|node| match node {
                    TreeNode::Leaf { class } => Some(*class),
                    TreeNode::Split { .. } => None,
                })
                .collect();
            classes.sort_unstable();
            classes.dedup();
        }

        ModelInfo {
            name: self.artifact.name.clone(),
            tree_count: self.artifact.trees.len(),
            max_depth: self
                .artifact
                .trees
                .iter()
                .map(DecisionTree::depth)
                .max()
                .unwrap_or(0),
            classes,
            feature_names: self.artifact.feature_names.clone(),
            source: self.source.as_ref().map(|path| path.display().to_string()),
            loaded_at: self.loaded_at,
        }
    }
}

impl Classifier for ForestModel {
    fn predict(&self, rows: &[EncodedFeatureVector]) -> Result<Vec<i64>, ClassifierError> {
        Ok(rows
            .iter()
            .map(|row| self.predict_row(row.as_slice()))
            .collect())
    }
}

/// Metadata exposed by the model endpoint and the `model inspect` command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelInfo {
    pub name: String,
    pub tree_count: usize,
    pub max_depth: usize,
    pub classes: Vec<i64>,
    pub feature_names: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub loaded_at: DateTime<Utc>,
}

/// Startup failure while reading or validating the model artifact.
#[derive(Debug, thiserror::Error)]
pub enum ModelLoadError {
    #[error("failed to open model artifact {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("model artifact is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("model columns {declared:?} do not match the expected feature order")]
    FeatureOrderMismatch { declared: Vec<String> },
    #[error("model artifact contains no trees")]
    EmptyForest,
    #[error("tree {tree} has no nodes")]
    EmptyTree { tree: usize },
    #[error("tree {tree} node {node} splits on feature {feature}, beyond the input width")]
    FeatureOutOfRange {
        tree: usize,
        node: usize,
        feature: usize,
    },
    #[error("tree {tree} node {node} points at invalid child {child}")]
    InvalidChild {
        tree: usize,
        node: usize,
        child: usize,
    },
}
