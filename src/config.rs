use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Script runtime settings. Loaded from JSON next to the game data; every
/// field has a default so a missing file still boots the demo layout.
#[derive(Debug, Clone, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default = "RuntimeConfig::default_scripts_root")]
    pub scripts_root: String,
    #[serde(default = "RuntimeConfig::default_module_extension")]
    pub module_extension: String,
    #[serde(default = "RuntimeConfig::default_main_script")]
    pub main_script: String,
    #[serde(default = "RuntimeConfig::default_entry_module")]
    pub entry_module: String,
    #[serde(default = "RuntimeConfig::default_entry_class")]
    pub entry_class: String,
}

impl RuntimeConfig {
    fn default_scripts_root() -> String {
        "scripts".to_string()
    }

    fn default_module_extension() -> String {
        "ltn".to_string()
    }

    fn default_main_script() -> String {
        "scripts/main.ltn".to_string()
    }

    fn default_entry_module() -> String {
        "main".to_string()
    }

    fn default_entry_class() -> String {
        "Game".to_string()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)
            .with_context(|| format!("Failed to read runtime config {}", path.display()))?;
        let cfg = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse runtime config {}", path.display()))?;
        Ok(cfg)
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                eprintln!("Runtime config load error: {err:?}. Falling back to defaults.");
                Self::default()
            }
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            scripts_root: Self::default_scripts_root(),
            module_extension: Self::default_module_extension(),
            main_script: Self::default_main_script(),
            entry_module: Self::default_entry_module(),
            entry_class: Self::default_entry_class(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn partial_config_fills_defaults() {
        let mut file = NamedTempFile::new().expect("temp config");
        write!(file, r#"{{ "main_script": "scripts/demo.ltn" }}"#).expect("write config");
        let cfg = RuntimeConfig::load(file.path()).expect("config should parse");
        assert_eq!(cfg.main_script, "scripts/demo.ltn");
        assert_eq!(cfg.entry_class, "Game");
        assert_eq!(cfg.scripts_root, "scripts");
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let cfg = RuntimeConfig::load_or_default("does/not/exist.json");
        assert_eq!(cfg.entry_module, "main");
    }
}
