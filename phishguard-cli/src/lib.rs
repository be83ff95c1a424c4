use phishguard_core::config::{self, Config};
use phishguard_core::decision;
use phishguard_core::engine::Analyzer;
use phishguard_core::model::ClassifierModel;
use phishguard_core::resolver::{DisabledLookup, DomainAgeLookup, RdapLookup};
use phishguard_core::types::{AnalysisReport, Degradation, FeatureVector, Outcome};
use phishguard_core::{logging, paths};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub fn run(args: &[String]) -> anyhow::Result<()> {
  let base = paths::base_dir()?;
  let cfg = config::load_or_create_default(&paths::config_path(&base))?;
  if args.iter().any(|a| a == "--verbose") {
    logging::init_file_and_stderr(
      &paths::logs_dir(&base),
      &cfg.logging.level,
      cfg.logging.retention_days,
    )?;
  } else {
    logging::init_file_only(
      &paths::logs_dir(&base),
      &cfg.logging.level,
      cfg.logging.retention_days,
    )?;
  }

  if args.iter().any(|a| a == "--help" || a == "-h") {
    print_help();
    return Ok(());
  }

  if let Some(i) = args.iter().position(|a| a == "--analyze") {
    return run_analyze(&cfg, &base, &args[i + 1..], args);
  }

  if let Some(i) = args.iter().position(|a| a == "--features") {
    return run_features(&args[i + 1..], args);
  }

  if args.iter().any(|a| a == "--model") {
    return run_model(&cfg, &base, args);
  }

  print_help();
  Ok(())
}

fn run_analyze(
  cfg: &Config,
  base: &std::path::Path,
  tail: &[String],
  args: &[String],
) -> anyhow::Result<()> {
  let url = positional(tail).ok_or_else(|| anyhow::anyhow!("expected: --analyze <url>"))?;

  let model = load_model(cfg, base)?;
  if model.is_none() {
    eprintln!("phishguard: no classifier model; reporting features only.");
  }

  let lookup = build_lookup(cfg, args.iter().any(|a| a == "--offline"));
  let analyzer = Analyzer::new(model, lookup);
  let report = analyzer.analyze(url);

  if args.iter().any(|a| a == "--json") {
    println!("{}", serde_json::to_string_pretty(&report)?);
    return Ok(());
  }

  print_report(&report);
  Ok(())
}

fn run_features(tail: &[String], args: &[String]) -> anyhow::Result<()> {
  let url = positional(tail).ok_or_else(|| anyhow::anyhow!("expected: --features <url>"))?;

  // Feature inspection is offline by definition; the age lookup would be
  // the only network touch and its absence is reported as unknown.
  let analyzer = Analyzer::new(None, Box::new(DisabledLookup));
  let (features, degraded) = analyzer.extract(url);

  if args.iter().any(|a| a == "--json") {
    let doc = features_json(&features, &degraded)?;
    println!("{}", serde_json::to_string_pretty(&doc)?);
    return Ok(());
  }

  println!("Features for: {url}");
  print!("{}", feature_table(&features));
  for d in &degraded {
    println!("  (degraded) {}: {}", d.feature, d.reason);
  }
  Ok(())
}

fn features_json(
  features: &FeatureVector,
  degraded: &[Degradation],
) -> anyhow::Result<serde_json::Value> {
  Ok(serde_json::json!({
    "features": features,
    "degraded": degraded,
  }))
}

fn run_model(cfg: &Config, base: &std::path::Path, args: &[String]) -> anyhow::Result<()> {
  let tail_is_status = args
    .iter()
    .position(|a| a == "--model")
    .and_then(|i| args.get(i + 1))
    .is_some_and(|s| s == "status");
  if !tail_is_status {
    eprintln!("Unknown `--model` subcommand. Expected: status");
    print_help();
    return Ok(());
  }

  let path = model_artifact_path(cfg, base);
  match ClassifierModel::load_optional(&path)? {
    Some(model) => {
      println!("Model: loaded");
      println!("Path: {}", path.display());
      println!("Trees: {}", model.tree_count());
    }
    None => {
      println!("Model: not available");
      println!("Path: {}", path.display());
      println!("Analyses will report features only until an artifact is installed.");
    }
  }
  Ok(())
}

fn load_model(cfg: &Config, base: &std::path::Path) -> anyhow::Result<Option<Arc<ClassifierModel>>> {
  let path = model_artifact_path(cfg, base);
  Ok(ClassifierModel::load_optional(&path)?.map(Arc::new))
}

fn model_artifact_path(cfg: &Config, base: &std::path::Path) -> PathBuf {
  cfg
    .model
    .path
    .clone()
    .unwrap_or_else(|| paths::model_path(base))
}

fn build_lookup(cfg: &Config, offline: bool) -> Box<dyn DomainAgeLookup + Send + Sync> {
  if offline || !cfg.lookup.enabled {
    return Box::new(DisabledLookup);
  }

  match RdapLookup::new(
    &cfg.lookup.endpoint,
    Duration::from_secs(cfg.lookup.timeout_seconds),
  ) {
    Ok(lookup) => Box::new(lookup),
    Err(e) => {
      tracing::warn!(error = %e, "RDAP client unavailable; domain age will be unknown");
      Box::new(DisabledLookup)
    }
  }
}

fn positional(tail: &[String]) -> Option<&str> {
  tail
    .iter()
    .map(|s| s.as_str())
    .find(|s| !s.starts_with("--"))
}

fn print_report(report: &AnalysisReport) {
  println!("URL: {}", report.url);
  println!("Analysis ID: {}", report.analysis_id);
  println!();

  match &report.outcome {
    Outcome::Verdict {
      label,
      probability,
      risk_flag_count,
    } => {
      println!("Verdict: {label:?}");
      println!("Phishing probability: {:.1}%", probability * 100.0);
      println!("Risk signals: {risk_flag_count}");
    }
    Outcome::ModelUnavailable => {
      println!("Verdict: unavailable (no classifier model)");
    }
  }

  let f = &report.features;
  println!();
  println!("STRUCTURAL ANOMALIES");
  print_flag("  '@' in URL", f.has_at);
  print_flag("  '//' redirection", f.has_double_slash);
  print_flag("  hyphen in host", f.has_hyphen);
  print_flag("  high numeric ratio", f.high_numeric_ratio);
  println!("  URL length: {}", f.url_length);

  println!("DOMAIN OBFUSCATION");
  print_flag("  raw IP host", f.has_ip);
  print_flag("  TLD in subdomain", f.tld_in_subdomain);
  print_flag("  suspicious TLD", f.suspicious_tld);
  println!("  subdomain count: {}", f.subdomain_count);

  println!("TECHNICAL METADATA");
  print_flag("  HTTPS", f.ssl);
  match f.domain_age {
    -1 => println!("  domain age: unknown"),
    0 => println!("  domain age: registered today"),
    days => println!("  domain age: {days} days"),
  }

  let flags = decision::risk_flags(&report.features);
  if !flags.is_empty() {
    println!();
    println!("Active risk signals: {}", flags.join(", "));
  }

  for d in &report.degraded {
    println!("  (degraded) {}: {}", d.feature, d.reason);
  }
}

fn print_flag(name: &str, value: i64) {
  println!("{name}: {}", if value == 1 { "yes" } else { "no" });
}

fn feature_table(f: &FeatureVector) -> String {
  use std::fmt::Write as _;
  let rows = [
    ("url_length", f.url_length),
    ("ssl", f.ssl),
    ("domain_age", f.domain_age),
    ("has_ip", f.has_ip),
    ("has_at", f.has_at),
    ("subdomain_count", f.subdomain_count),
    ("has_hyphen", f.has_hyphen),
    ("has_double_slash", f.has_double_slash),
    ("has_custom_port", f.has_custom_port),
    ("tld_in_subdomain", f.tld_in_subdomain),
    ("suspicious_tld", f.suspicious_tld),
    ("high_numeric_ratio", f.high_numeric_ratio),
  ];

  let mut out = String::new();
  for (name, value) in rows {
    let _ = writeln!(out, "  {name:<18} = {value}");
  }
  out
}

fn print_help() {
  println!("phishguard v{} (URL analysis)", env!("CARGO_PKG_VERSION"));
  println!("Commands:");
  println!("  --analyze <url> [--offline] [--json]");
  println!("  --features <url> [--json]");
  println!("  --model status");
  println!("  --verbose (global; echoes log output to stderr)");
  println!("  --version");
}
