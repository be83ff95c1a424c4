//! Classifier adapter. Wraps a pre-trained decision-tree ensemble over the
//! fixed 12-feature schema, serialized as a JSON artifact by the offline
//! trainer. The artifact is loaded once per process and shared read-only.

use crate::types::{FeatureVector, Label, FEATURE_COUNT, FEATURE_NAMES};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const ARTIFACT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
  pub schema_version: u32,
  pub feature_names: Vec<String>,
  pub trees: Vec<Tree>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
  pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
  Split {
    feature: usize,
    threshold: f64,
    left: usize,
    right: usize,
  },
  Leaf {
    probability: f64,
  },
}

#[derive(Debug, Clone, Copy)]
pub struct Prediction {
  pub label: Label,
  pub probability: f64,
}

#[derive(Debug, Clone)]
pub struct ClassifierModel {
  trees: Vec<Tree>,
}

impl ClassifierModel {
  /// Load the artifact if one is present. A missing or unparsable file is
  /// the recoverable "model unavailable" state; a well-formed artifact with
  /// the wrong feature schema is a configuration error and fails hard.
  pub fn load_optional(path: &Path) -> anyhow::Result<Option<Self>> {
    let raw = match fs::read(path) {
      Ok(bytes) => bytes,
      Err(e) => {
        tracing::warn!(
          path = %path.display(),
          error = %e,
          "model artifact not readable; analyses will report features only"
        );
        return Ok(None);
      }
    };

    let artifact: ModelArtifact = match serde_json::from_slice(&raw) {
      Ok(a) => a,
      Err(e) => {
        tracing::warn!(
          path = %path.display(),
          error = %e,
          "model artifact corrupt; analyses will report features only"
        );
        return Ok(None);
      }
    };

    Self::from_artifact(artifact).map(Some)
  }

  pub fn from_artifact(artifact: ModelArtifact) -> anyhow::Result<Self> {
    validate_artifact(&artifact)?;
    Ok(Self {
      trees: artifact.trees,
    })
  }

  /// Hard label and phishing-class probability for one feature vector.
  /// Probability is the mean leaf probability across trees.
  pub fn predict(&self, features: &FeatureVector) -> Prediction {
    let row = features.as_row();
    let total: f64 = self.trees.iter().map(|tree| score_tree(tree, &row)).sum();
    let probability = total / self.trees.len() as f64;
    let label = if probability >= 0.5 {
      Label::Phishing
    } else {
      Label::Safe
    };
    Prediction { label, probability }
  }

  pub fn tree_count(&self) -> usize {
    self.trees.len()
  }
}

fn validate_artifact(artifact: &ModelArtifact) -> anyhow::Result<()> {
  if artifact.schema_version != ARTIFACT_SCHEMA_VERSION {
    anyhow::bail!(
      "unsupported model schema version {}; expected {}",
      artifact.schema_version,
      ARTIFACT_SCHEMA_VERSION
    );
  }

  if artifact.feature_names.len() != FEATURE_COUNT
    || artifact
      .feature_names
      .iter()
      .zip(FEATURE_NAMES.iter())
      .any(|(have, want)| have != want)
  {
    anyhow::bail!(
      "model feature schema mismatch: expected {:?}, artifact has {:?}",
      FEATURE_NAMES,
      artifact.feature_names
    );
  }

  if artifact.trees.is_empty() {
    anyhow::bail!("model artifact has no trees");
  }

  for (i, tree) in artifact.trees.iter().enumerate() {
    if tree.nodes.is_empty() {
      anyhow::bail!("tree {i} has no nodes");
    }
    for node in &tree.nodes {
      if let Node::Split {
        feature,
        left,
        right,
        ..
      } = node
      {
        if *feature >= FEATURE_COUNT {
          anyhow::bail!("tree {i} references feature index {feature} out of range");
        }
        if *left >= tree.nodes.len() || *right >= tree.nodes.len() {
          anyhow::bail!("tree {i} has a child index out of range");
        }
      }
    }
  }

  Ok(())
}

fn score_tree(tree: &Tree, row: &[f64; FEATURE_COUNT]) -> f64 {
  let mut idx = 0usize;
  // Validated indices stay in bounds; the step cap terminates traversal if
  // a hand-edited artifact contains a node cycle.
  for _ in 0..=tree.nodes.len() {
    match &tree.nodes[idx] {
      Node::Leaf { probability } => return *probability,
      Node::Split {
        feature,
        threshold,
        left,
        right,
      } => {
        idx = if row[*feature] <= *threshold {
          *left
        } else {
          *right
        };
      }
    }
  }
  0.5
}
