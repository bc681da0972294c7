//! CLI configuration loading

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use linechat_core::LinkConfig;
use linechat_tcp::TcpConfig;

/// On-disk configuration, all sections optional
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub link: LinkConfig,
    pub tcp: TcpConfig,
}

impl CliConfig {
    /// Load from `path` if given, else from the default location if it
    /// exists, else built-in defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(CliConfig::default()),
            },
        };
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parsing config file {}", path.display()))
    }

    fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("linechat").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: CliConfig = toml::from_str(
            r#"
            [tcp]
            insecure_addr = "0.0.0.0:9000"
            "#,
        )
        .unwrap();
        assert_eq!(config.tcp.insecure_addr, "0.0.0.0:9000");
        assert_eq!(config.link.read_chunk_size, 128);
        assert!(config.link.listen_secure);
    }
}
