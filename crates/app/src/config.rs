use std::path::PathBuf;

use anyhow::Context;
use financas_import::KeywordTable;
use serde::Deserialize;

/// App configuration, read from `~/.config/financas/config.toml` with
/// environment overrides (`FINANCAS_API_URL`, `FINANCAS_API_TOKEN`).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    pub api_token: Option<String>,
    /// Extra categorization rules, tried before the built-in table.
    pub keywords_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: "http://localhost:3001/api".to_string(),
            api_token: None,
            keywords_file: None,
        }
    }
}

fn config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("financas")
        .join("config.toml")
}

pub fn load() -> anyhow::Result<Config> {
    let path = config_path();
    let mut config = if path.exists() {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?
    } else {
        Config::default()
    };

    if let Ok(url) = std::env::var("FINANCAS_API_URL") {
        config.api_url = url;
    }
    if let Ok(token) = std::env::var("FINANCAS_API_TOKEN") {
        config.api_token = Some(token);
    }
    Ok(config)
}

impl Config {
    pub fn keyword_table(&self) -> anyhow::Result<KeywordTable> {
        match &self.keywords_file {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                KeywordTable::builtin_with_toml(&content)
                    .with_context(|| format!("parsing {}", path.display()))
            }
            None => Ok(KeywordTable::builtin()),
        }
    }
}
