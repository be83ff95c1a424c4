//! Analysis pipeline: assemble the feature vector, run the classifier,
//! apply the override rule, and wrap everything in a report.

use crate::decision;
use crate::features::{self, Extraction};
use crate::model::ClassifierModel;
use crate::resolver::{self, DomainAgeLookup};
use crate::types::{now_unix_ms, AnalysisReport, Degradation, FeatureVector, Outcome};
use std::sync::Arc;

pub struct Analyzer {
  model: Option<Arc<ClassifierModel>>,
  lookup: Box<dyn DomainAgeLookup + Send + Sync>,
}

impl Analyzer {
  /// The model handle is injected once at construction and shared
  /// read-only; a `None` model is the valid "unavailable" state and every
  /// analysis still produces a feature report.
  pub fn new(
    model: Option<Arc<ClassifierModel>>,
    lookup: Box<dyn DomainAgeLookup + Send + Sync>,
  ) -> Self {
    Self { model, lookup }
  }

  pub fn has_model(&self) -> bool {
    self.model.is_some()
  }

  /// Analyze one URL. Never fails: malformed input degrades to defaults
  /// and a missing model yields a `ModelUnavailable` outcome.
  pub fn analyze(&self, url: &str) -> AnalysisReport {
    let (features, degraded) = self.extract(url);

    let outcome = match self.model.as_deref() {
      Some(model) => {
        let prediction = model.predict(&features);
        let verdict = decision::decide(&features, prediction.label, prediction.probability);
        tracing::info!(
          label = ?verdict.label,
          probability = verdict.probability,
          risk_flags = verdict.risk_flag_count,
          url_length = features.url_length,
          "analysis complete"
        );
        Outcome::Verdict {
          label: verdict.label,
          probability: verdict.probability,
          risk_flag_count: verdict.risk_flag_count,
        }
      }
      None => {
        tracing::warn!("classifier model unavailable; reporting features only");
        Outcome::ModelUnavailable
      }
    };

    AnalysisReport {
      analysis_id: uuid::Uuid::new_v4().to_string(),
      url: url.to_string(),
      features,
      degraded,
      outcome,
      created_at_unix_ms: now_unix_ms(),
    }
  }

  /// Assemble the full 12-field vector in the canonical order. Every field
  /// is populated for any input string; extractor fallbacks surface as
  /// degradation entries rather than errors.
  pub fn extract(&self, url: &str) -> (FeatureVector, Vec<Degradation>) {
    let mut degraded = Vec::new();
    let mut take = |name: &'static str, extraction: Extraction| {
      if let Some(reason) = extraction.degraded {
        tracing::debug!(feature = name, reason, "extractor fell back to default");
        degraded.push(Degradation {
          feature: name.to_string(),
          reason: reason.to_string(),
        });
      }
      extraction.value
    };

    let features = FeatureVector {
      url_length: take("url_length", features::url_length(url)),
      ssl: take("ssl", resolver::check_ssl(url)),
      domain_age: take("domain_age", resolver::domain_age(self.lookup.as_ref(), url)),
      has_ip: take("has_ip", features::has_ip(url)),
      has_at: take("has_at", features::has_at(url)),
      subdomain_count: take("subdomain_count", features::subdomain_count(url)),
      has_hyphen: take("has_hyphen", features::has_hyphen(url)),
      has_double_slash: take("has_double_slash", features::has_double_slash(url)),
      has_custom_port: take("has_custom_port", features::has_custom_port(url)),
      tld_in_subdomain: take("tld_in_subdomain", features::tld_in_subdomain(url)),
      suspicious_tld: take("suspicious_tld", features::suspicious_tld(url)),
      high_numeric_ratio: take("high_numeric_ratio", features::high_numeric_ratio(url)),
    };

    (features, degraded)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::{ModelArtifact, Node, Tree};
  use crate::resolver::DisabledLookup;
  use crate::types::{Label, FEATURE_NAMES};
  use chrono::{DateTime, Duration, Utc};
  use proptest::prelude::*;

  struct AgedLookup(i64);

  impl DomainAgeLookup for AgedLookup {
    fn creation_date(&self, _host: &str) -> anyhow::Result<Option<DateTime<Utc>>> {
      Ok(Some(Utc::now() - Duration::days(self.0)))
    }
  }

  fn feature_names() -> Vec<String> {
    FEATURE_NAMES.iter().map(|s| s.to_string()).collect()
  }

  // Stump on ssl: its absence is the phishing branch.
  fn ssl_model() -> Arc<ClassifierModel> {
    Arc::new(
      ClassifierModel::from_artifact(ModelArtifact {
        schema_version: 1,
        feature_names: feature_names(),
        trees: vec![Tree {
          nodes: vec![
            Node::Split {
              feature: 1,
              threshold: 0.5,
              left: 1,
              right: 2,
            },
            Node::Leaf { probability: 0.95 },
            Node::Leaf { probability: 0.05 },
          ],
        }],
      })
      .unwrap(),
    )
  }

  #[test]
  fn aged_https_domain_comes_out_safe() {
    let analyzer = Analyzer::new(Some(ssl_model()), Box::new(AgedLookup(8000)));
    let report = analyzer.analyze("https://www.wikipedia.org");

    assert_eq!(report.features.ssl, 1);
    assert!(report.features.domain_age > 365);
    assert_eq!(report.features.has_ip, 0);
    assert_eq!(report.features.suspicious_tld, 0);
    match report.outcome {
      Outcome::Verdict { label, .. } => assert_eq!(label, Label::Safe),
      Outcome::ModelUnavailable => panic!("model was provided"),
    }
  }

  #[test]
  fn hostile_url_trips_multiple_flags_and_stays_phishing() {
    let analyzer = Analyzer::new(Some(ssl_model()), Box::new(DisabledLookup));
    let report = analyzer.analyze("http://paypal-secure.tk/login@evil.com//reset");

    assert_eq!(report.features.has_at, 1);
    assert_eq!(report.features.has_double_slash, 1);
    assert_eq!(report.features.suspicious_tld, 1);
    assert_eq!(report.features.ssl, 0);
    assert_eq!(report.features.domain_age, -1);

    match report.outcome {
      Outcome::Verdict {
        label,
        risk_flag_count,
        ..
      } => {
        assert!(risk_flag_count >= 4);
        assert_eq!(label, Label::Phishing);
      }
      Outcome::ModelUnavailable => panic!("model was provided"),
    }
  }

  #[test]
  fn lone_ssl_flag_is_overridden_to_safe() {
    // Classifier says phishing (no ssl), but nothing else corroborates and
    // the lookup failure is not a flag.
    let analyzer = Analyzer::new(Some(ssl_model()), Box::new(DisabledLookup));
    let report = analyzer.analyze("http://example.com/about");

    match report.outcome {
      Outcome::Verdict {
        label,
        risk_flag_count,
        ..
      } => {
        assert_eq!(risk_flag_count, 1);
        assert_eq!(label, Label::Safe);
      }
      Outcome::ModelUnavailable => panic!("model was provided"),
    }
  }

  #[test]
  fn missing_model_still_reports_features() {
    let analyzer = Analyzer::new(None, Box::new(DisabledLookup));
    let report = analyzer.analyze("https://example.com");
    assert!(matches!(report.outcome, Outcome::ModelUnavailable));
    assert_eq!(report.features.ssl, 1);
    assert!(!report.analysis_id.is_empty());
  }

  #[test]
  fn lookup_failure_surfaces_as_degradation() {
    let analyzer = Analyzer::new(None, Box::new(DisabledLookup));
    let (features, degraded) = analyzer.extract("https://example.com");
    assert_eq!(features.domain_age, -1);
    assert!(degraded.iter().any(|d| d.feature == "domain_age"));
  }

  proptest! {
    // Any string at all yields a fully populated vector within each
    // field's domain.
    #[test]
    fn vector_is_always_fully_populated(url in ".{0,200}") {
      let analyzer = Analyzer::new(None, Box::new(DisabledLookup));
      let (f, _) = analyzer.extract(&url);

      prop_assert!(f.url_length >= 0);
      for flag in [
        f.ssl, f.has_ip, f.has_at, f.has_hyphen, f.has_double_slash,
        f.has_custom_port, f.tld_in_subdomain, f.suspicious_tld,
        f.high_numeric_ratio,
      ] {
        prop_assert!(flag == 0 || flag == 1);
      }
      prop_assert!(f.subdomain_count >= 0);
      prop_assert!(f.domain_age >= -1);
    }
  }
}
