//! File-resident gradient-boosted-tree artifact.
//!
//! The artifact is a versioned JSON file describing an additive tree
//! ensemble: a base score plus one correction per tree, each tree a flat
//! node array walked from node 0 (`x[feature] <= threshold` goes left).
//! Training lives elsewhere; this module only loads, validates, and
//! evaluates.
//!
//! Structural validation happens once at load so scoring itself cannot fail:
//!
//! - the artifact's feature list must equal `FEATURE_ORDER` exactly (the
//!   column-order contract the model was trained against)
//! - split feature indices must be in range
//! - child indices must point strictly forward in the node array, which
//!   makes every walk terminate
//! - thresholds, leaf values, and the base score must be finite

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{FEATURE_COUNT, FEATURE_ORDER, FeatureVector};
use crate::error::AppError;
use crate::model::Scorer;

/// Artifact schema version this build understands.
pub const ARTIFACT_VERSION: u32 = 1;

/// Prediction target tag expected in the artifact.
const OBJECTIVE: &str = "log_multiple";

/// On-disk artifact schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelFile {
    pub tool: String,
    pub version: u32,
    pub objective: String,
    pub features: Vec<String>,
    pub base_score: f64,
    pub trees: Vec<Tree>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

/// A loaded, validated ensemble. Immutable after loading; load it once at
/// process start and share it by reference.
#[derive(Debug)]
pub struct GbtModel {
    file: ModelFile,
    label: String,
}

impl GbtModel {
    /// Load and validate an artifact from disk.
    pub fn from_path(path: &Path) -> Result<Self, AppError> {
        let file = File::open(path).map_err(|e| {
            AppError::model(format!(
                "Failed to open model artifact '{}': {e}",
                path.display()
            ))
        })?;
        let parsed: ModelFile = serde_json::from_reader(file).map_err(|e| {
            AppError::model(format!(
                "Invalid model artifact '{}': {e}",
                path.display()
            ))
        })?;
        let label = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::from_file(parsed, label)
    }

    /// Validate an already-parsed artifact.
    pub fn from_file(file: ModelFile, label: String) -> Result<Self, AppError> {
        if file.version != ARTIFACT_VERSION {
            return Err(AppError::model(format!(
                "Unsupported model artifact version {} (expected {ARTIFACT_VERSION}).",
                file.version
            )));
        }
        if file.objective != OBJECTIVE {
            return Err(AppError::model(format!(
                "Model objective '{}' is not '{OBJECTIVE}'.",
                file.objective
            )));
        }
        if file.features != FEATURE_ORDER {
            return Err(AppError::model(format!(
                "Model feature list {:?} does not match the expected column order {:?}.",
                file.features, FEATURE_ORDER
            )));
        }
        if !file.base_score.is_finite() {
            return Err(AppError::model("Model base score is not finite."));
        }
        if file.trees.is_empty() {
            return Err(AppError::model("Model artifact contains no trees."));
        }
        for (t, tree) in file.trees.iter().enumerate() {
            validate_tree(t, tree)?;
        }
        Ok(Self { file, label })
    }

    /// Sum of the base score and every tree's leaf for this row.
    fn predict_row(&self, row: &[f64; FEATURE_COUNT]) -> f64 {
        let mut total = self.file.base_score;
        for tree in &self.file.trees {
            total += walk_tree(tree, row);
        }
        total
    }
}

impl Scorer for GbtModel {
    fn score(&self, features: &FeatureVector) -> Result<f64, AppError> {
        Ok(self.predict_row(features.values()))
    }

    fn describe(&self) -> String {
        format!(
            "{} (v{}, {} trees)",
            self.label,
            self.file.version,
            self.file.trees.len()
        )
    }
}

fn validate_tree(index: usize, tree: &Tree) -> Result<(), AppError> {
    if tree.nodes.is_empty() {
        return Err(AppError::model(format!("Tree {index} has no nodes.")));
    }
    for (n, node) in tree.nodes.iter().enumerate() {
        match node {
            Node::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if *feature >= FEATURE_COUNT {
                    return Err(AppError::model(format!(
                        "Tree {index} node {n}: feature index {feature} is out of range."
                    )));
                }
                if !threshold.is_finite() {
                    return Err(AppError::model(format!(
                        "Tree {index} node {n}: threshold is not finite."
                    )));
                }
                // Forward-only children guarantee termination.
                for child in [*left, *right] {
                    if child <= n || child >= tree.nodes.len() {
                        return Err(AppError::model(format!(
                            "Tree {index} node {n}: child index {child} is invalid."
                        )));
                    }
                }
            }
            Node::Leaf { value } => {
                if !value.is_finite() {
                    return Err(AppError::model(format!(
                        "Tree {index} node {n}: leaf value is not finite."
                    )));
                }
            }
        }
    }
    Ok(())
}

fn walk_tree(tree: &Tree, row: &[f64; FEATURE_COUNT]) -> f64 {
    let mut at = 0usize;
    loop {
        match &tree.nodes[at] {
            Node::Leaf { value } => return *value,
            Node::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                at = if row[*feature] <= *threshold {
                    *left
                } else {
                    *right
                };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two-tree ensemble: base 1.0, first tree splits on sale_eb (slot 5) at
    /// 5.0 giving -0.2/+0.3, second tree is a constant +0.1 leaf.
    fn ensemble() -> ModelFile {
        ModelFile {
            tool: "mval".to_string(),
            version: ARTIFACT_VERSION,
            objective: "log_multiple".to_string(),
            features: FEATURE_ORDER.iter().map(|s| s.to_string()).collect(),
            base_score: 1.0,
            trees: vec![
                Tree {
                    nodes: vec![
                        Node::Split {
                            feature: 5,
                            threshold: 5.0,
                            left: 1,
                            right: 2,
                        },
                        Node::Leaf { value: -0.2 },
                        Node::Leaf { value: 0.3 },
                    ],
                },
                Tree {
                    nodes: vec![Node::Leaf { value: 0.1 }],
                },
            ],
        }
    }

    fn row(sale_eb: f64) -> FeatureVector {
        FeatureVector::from_values([3.0, 2.0, 0.4, 45.0, 0.02, sale_eb])
    }

    #[test]
    fn scores_deterministically() {
        let model = GbtModel::from_file(ensemble(), "test".to_string()).unwrap();
        // sale_eb = 6.0 goes right: 1.0 + 0.3 + 0.1.
        assert!((model.score(&row(6.0)).unwrap() - 1.4).abs() < 1e-12);
        // sale_eb = 4.0 goes left: 1.0 - 0.2 + 0.1.
        assert!((model.score(&row(4.0)).unwrap() - 0.9).abs() < 1e-12);
        // Boundary goes left (<=).
        assert!((model.score(&row(5.0)).unwrap() - 0.9).abs() < 1e-12);
    }

    #[test]
    fn parses_json_round_trip() {
        let json = serde_json::to_string(&ensemble()).unwrap();
        let parsed: ModelFile = serde_json::from_str(&json).unwrap();
        let model = GbtModel::from_file(parsed, "test".to_string()).unwrap();
        assert!((model.score(&row(6.0)).unwrap() - 1.4).abs() < 1e-12);
    }

    #[test]
    fn rejects_wrong_feature_order() {
        let mut bad = ensemble();
        bad.features.swap(0, 1);
        let err = GbtModel::from_file(bad, "test".to_string()).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_MODEL);
    }

    #[test]
    fn rejects_unsupported_version() {
        let mut bad = ensemble();
        bad.version = ARTIFACT_VERSION + 1;
        assert!(GbtModel::from_file(bad, "test".to_string()).is_err());
    }

    #[test]
    fn rejects_wrong_objective() {
        let mut bad = ensemble();
        bad.objective = "multiple".to_string();
        assert!(GbtModel::from_file(bad, "test".to_string()).is_err());
    }

    #[test]
    fn rejects_backward_child_index() {
        let mut bad = ensemble();
        bad.trees[0].nodes[0] = Node::Split {
            feature: 5,
            threshold: 5.0,
            left: 0,
            right: 2,
        };
        assert!(GbtModel::from_file(bad, "test".to_string()).is_err());
    }

    #[test]
    fn rejects_out_of_range_feature_index() {
        let mut bad = ensemble();
        bad.trees[0].nodes[0] = Node::Split {
            feature: FEATURE_COUNT,
            threshold: 5.0,
            left: 1,
            right: 2,
        };
        assert!(GbtModel::from_file(bad, "test".to_string()).is_err());
    }

    #[test]
    fn rejects_empty_ensemble() {
        let mut bad = ensemble();
        bad.trees.clear();
        assert!(GbtModel::from_file(bad, "test".to_string()).is_err());
    }
}
