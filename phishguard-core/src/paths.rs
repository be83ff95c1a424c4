use std::path::{Path, PathBuf};

pub fn base_dir() -> anyhow::Result<PathBuf> {
  if let Ok(custom) = std::env::var("PHISHGUARD_HOME") {
    if !custom.is_empty() {
      return Ok(PathBuf::from(custom));
    }
  }

  let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME is not set"))?;
  Ok(PathBuf::from(home).join(".phishguard"))
}

pub fn config_path(base: &Path) -> PathBuf {
  base.join("config.toml")
}

pub fn logs_dir(base: &Path) -> PathBuf {
  base.join("logs")
}

pub fn model_path(base: &Path) -> PathBuf {
  base.join("model.json")
}
