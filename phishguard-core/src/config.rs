use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct Config {
  pub logging: LoggingConfig,
  pub model: ModelConfig,
  pub lookup: LookupConfig,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      logging: LoggingConfig::default(),
      model: ModelConfig::default(),
      lookup: LookupConfig::default(),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
  #[serde(default = "default_log_level")]
  pub level: String,

  #[serde(default = "default_retention_days")]
  pub retention_days: u64,
}

fn default_log_level() -> String {
  "info".to_string()
}

fn default_retention_days() -> u64 {
  14
}

impl Default for LoggingConfig {
  fn default() -> Self {
    Self {
      level: default_log_level(),
      retention_days: default_retention_days(),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ModelConfig {
  /// Overrides the model artifact location; `None` means `<base>/model.json`.
  #[serde(default)]
  pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupConfig {
  #[serde(default = "default_true")]
  pub enabled: bool,

  #[serde(default = "default_lookup_endpoint")]
  pub endpoint: String,

  #[serde(default = "default_lookup_timeout_seconds")]
  pub timeout_seconds: u64,
}

impl Default for LookupConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      endpoint: default_lookup_endpoint(),
      timeout_seconds: default_lookup_timeout_seconds(),
    }
  }
}

fn default_true() -> bool {
  true
}

fn default_lookup_endpoint() -> String {
  "https://rdap.org".to_string()
}

fn default_lookup_timeout_seconds() -> u64 {
  5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
  #[serde(default)]
  pub logging: Option<LoggingConfig>,

  #[serde(default)]
  pub model: Option<ModelConfig>,

  #[serde(default)]
  pub lookup: Option<LookupConfig>,
}

impl ConfigFile {
  fn normalize(self) -> Config {
    let mut cfg = Config::default();
    if let Some(l) = self.logging {
      cfg.logging = l;
    }
    if let Some(m) = self.model {
      cfg.model = m;
    }
    if let Some(lk) = self.lookup {
      cfg.lookup = lk;
    }

    if let Some(reason) = validate_lookup_config(&cfg.lookup) {
      cfg.lookup.enabled = false;
      tracing::warn!(
        reason = %reason,
        "lookup config invalid; domain age lookups disabled"
      );
    }

    cfg
  }

  fn needs_upgrade(&self) -> bool {
    self.logging.is_none() || self.model.is_none() || self.lookup.is_none()
  }
}

pub fn load_or_create_default(path: &Path) -> anyhow::Result<Config> {
  let parent = path
    .parent()
    .ok_or_else(|| anyhow::anyhow!("config path has no parent: {}", path.display()))?;
  fs::create_dir_all(parent)?;

  if !path.exists() {
    let cfg = Config::default();
    write_atomic(path, &toml::to_string_pretty(&to_config_file(&cfg))?)?;
    return Ok(cfg);
  }

  let raw = fs::read_to_string(path)?;
  match toml::from_str::<ConfigFile>(&raw) {
    Ok(file) => {
      let cfg = file.clone().normalize();
      if file.needs_upgrade() {
        let _ = write_atomic(path, &toml::to_string_pretty(&to_config_file(&cfg))?);
      }
      Ok(cfg)
    }
    Err(e) => {
      let cfg = Config::default();
      let ts = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
      let backup = parent.join(format!("config.toml.bad-{ts}"));
      let _ = fs::rename(path, &backup);
      write_atomic(path, &toml::to_string_pretty(&to_config_file(&cfg))?)?;
      eprintln!(
        "phishguard: invalid config at {} (backed up to {}): {e}",
        path.display(),
        backup.display()
      );
      Ok(cfg)
    }
  }
}

fn to_config_file(cfg: &Config) -> ConfigFile {
  ConfigFile {
    logging: Some(cfg.logging.clone()),
    model: Some(cfg.model.clone()),
    lookup: Some(cfg.lookup.clone()),
  }
}

fn write_atomic(path: &Path, contents: &str) -> anyhow::Result<()> {
  let parent = path
    .parent()
    .ok_or_else(|| anyhow::anyhow!("file path has no parent: {}", path.display()))?;
  let tmp = parent.join(format!(
    ".{}.tmp",
    path.file_name().unwrap_or_default().to_string_lossy()
  ));

  fs::write(&tmp, contents)?;
  fs::rename(&tmp, path)?;
  Ok(())
}

fn validate_lookup_config(cfg: &LookupConfig) -> Option<String> {
  if cfg.timeout_seconds == 0 {
    return Some("timeout_seconds must be > 0".to_string());
  }

  let Ok(url) = reqwest::Url::parse(&cfg.endpoint) else {
    return Some(format!("invalid endpoint URL: {}", cfg.endpoint));
  };
  if url.scheme() != "https" {
    return Some(format!("endpoint must use HTTPS: {}", cfg.endpoint));
  }

  None
}
