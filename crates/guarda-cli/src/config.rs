//! Configuração opcional em TOML.
//!
//! ```toml
//! state_dir = "/var/lib/guarda"
//! log_filter = "info"
//! ```

use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GuardaConfig {
    /// Diretório onde fica o blob `guarda.items.json`
    pub state_dir: Option<PathBuf>,
    /// Filtro do tracing quando `RUST_LOG` não está definido
    pub log_filter: Option<String>,
}

impl GuardaConfig {
    /// Sem caminho, usa os padrões
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::from_path(path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Falha ao ler config '{}'", path.display()))?;
        Self::parse(&text).with_context(|| format!("Config inválida em '{}'", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn state_dir(&self) -> PathBuf {
        self.state_dir.clone().unwrap_or_else(default_state_dir)
    }

    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }
}

/// `<data_dir>/guarda`, ou `./data` quando o SO não informa um
pub fn default_state_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("guarda"))
        .unwrap_or_else(|| PathBuf::from("data"))
}
