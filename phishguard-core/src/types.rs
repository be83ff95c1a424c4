use serde::{Deserialize, Serialize};

pub const FEATURE_COUNT: usize = 12;

/// Canonical feature order. This is the coupling contract with the trained
/// model artifact: any artifact whose schema differs from this list is
/// rejected at load time.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
  "url_length",
  "ssl",
  "domain_age",
  "has_ip",
  "has_at",
  "subdomain_count",
  "has_hyphen",
  "has_double_slash",
  "has_custom_port",
  "tld_in_subdomain",
  "suspicious_tld",
  "high_numeric_ratio",
];

/// Fixed-schema encoding of a URL's structural properties. Every field is
/// always populated; extraction failures land on a default value (or the
/// -1 sentinel for `domain_age`), never on a missing field.
///
/// `domain_age` is the only three-way field: -1 means the registry lookup
/// failed (unknown), 0 means confirmed registered today, positive values
/// are age in days. -1 and 0 must never be conflated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureVector {
  pub url_length: i64,
  pub ssl: i64,
  pub domain_age: i64,
  pub has_ip: i64,
  pub has_at: i64,
  pub subdomain_count: i64,
  pub has_hyphen: i64,
  pub has_double_slash: i64,
  pub has_custom_port: i64,
  pub tld_in_subdomain: i64,
  pub suspicious_tld: i64,
  pub high_numeric_ratio: i64,
}

impl FeatureVector {
  /// Row in the order of `FEATURE_NAMES`, as consumed by the classifier.
  pub fn as_row(&self) -> [f64; FEATURE_COUNT] {
    [
      self.url_length as f64,
      self.ssl as f64,
      self.domain_age as f64,
      self.has_ip as f64,
      self.has_at as f64,
      self.subdomain_count as f64,
      self.has_hyphen as f64,
      self.has_double_slash as f64,
      self.has_custom_port as f64,
      self.tld_in_subdomain as f64,
      self.suspicious_tld as f64,
      self.high_numeric_ratio as f64,
    ]
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
  Safe,
  Phishing,
}

/// Final decision for one analysis. Constructed fresh per request and never
/// persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
  pub label: Label,
  pub probability: f64,
  pub risk_flag_count: u32,
  pub features: FeatureVector,
}

/// One extractor falling back to its default instead of computing a real
/// signal. The default-value contract is unchanged; this only makes the
/// fallback observable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Degradation {
  pub feature: String,
  pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outcome {
  Verdict {
    label: Label,
    probability: f64,
    risk_flag_count: u32,
  },
  ModelUnavailable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
  pub analysis_id: String,
  pub url: String,
  pub features: FeatureVector,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub degraded: Vec<Degradation>,
  pub outcome: Outcome,
  pub created_at_unix_ms: u64,
}

pub fn now_unix_ms() -> u64 {
  use std::time::{SystemTime, UNIX_EPOCH};
  SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .unwrap_or_default()
    .as_millis() as u64
}
