//! Decision engine: combines the classifier's output with a rule-derived
//! risk score. Pure and deterministic over its inputs.

use crate::types::{FeatureVector, Label, Verdict};

/// A classifier-positive verdict with this many corroborating flags or
/// fewer is demoted to Safe. A lone signal is frequently an unknown-age
/// false trigger and is treated as insufficient corroboration.
pub const OVERRIDE_MAX_FLAGS: u32 = 1;

/// Names of the risk signals present in a vector, in display order.
/// `domain_age == -1` (lookup failed) is deliberately not a flag; only a
/// confirmed same-day registration counts.
pub fn risk_flags(features: &FeatureVector) -> Vec<&'static str> {
  let mut flags = Vec::new();
  if features.has_ip == 1 {
    flags.push("raw_ip_host");
  }
  if features.has_at == 1 {
    flags.push("at_redirection");
  }
  if features.has_double_slash == 1 {
    flags.push("double_slash_redirection");
  }
  if features.has_custom_port == 1 {
    flags.push("custom_port");
  }
  if features.tld_in_subdomain == 1 {
    flags.push("tld_in_subdomain");
  }
  if features.suspicious_tld == 1 {
    flags.push("suspicious_tld");
  }
  if features.high_numeric_ratio == 1 {
    flags.push("high_numeric_ratio");
  }
  if features.ssl == 0 {
    flags.push("no_ssl");
  }
  if features.domain_age == 0 {
    flags.push("newly_registered");
  }
  flags
}

pub fn risk_flag_count(features: &FeatureVector) -> u32 {
  risk_flags(features).len() as u32
}

/// Final verdict from the classifier label, its probability, and the
/// feature snapshot. A Safe classifier label always stands; a Phishing
/// label stands only with more than `OVERRIDE_MAX_FLAGS` corroborating
/// signals.
pub fn decide(features: &FeatureVector, label: Label, probability: f64) -> Verdict {
  let count = risk_flag_count(features);
  let final_label = match label {
    Label::Safe => Label::Safe,
    Label::Phishing if count <= OVERRIDE_MAX_FLAGS => Label::Safe,
    Label::Phishing => Label::Phishing,
  };

  Verdict {
    label: final_label,
    probability,
    risk_flag_count: count,
    features: features.clone(),
  }
}
