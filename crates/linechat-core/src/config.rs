//! Runtime configuration for the connection core

use serde::{Deserialize, Serialize};

use crate::types::SocketVariant;
use crate::LinechatError;

// ----------------------------------------------------------------------------
// Link Configuration
// ----------------------------------------------------------------------------

/// Tunables for the connection orchestrator and its session worker
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Maximum bytes pulled from the stream per read
    pub read_chunk_size: usize,
    /// Maximum bytes accumulated per frame before the session is failed
    pub max_frame_len: usize,
    /// Spawn a secure-variant listener on `start()`
    pub listen_secure: bool,
    /// Spawn an insecure-variant listener on `start()`
    pub listen_insecure: bool,
}

impl Default for LinkConfig {
    fn default() -> Self {
        LinkConfig {
            read_chunk_size: 128,
            max_frame_len: 1024,
            listen_secure: true,
            listen_insecure: true,
        }
    }
}

impl LinkConfig {
    /// Whether `start()` should run a listener for the given variant
    pub fn listens(&self, variant: SocketVariant) -> bool {
        match variant {
            SocketVariant::Secure => self.listen_secure,
            SocketVariant::Insecure => self.listen_insecure,
        }
    }

    /// Reject tunables the session worker cannot run with
    pub fn validate(&self) -> crate::Result<()> {
        if self.read_chunk_size == 0 {
            return Err(LinechatError::InvalidConfiguration(
                "read_chunk_size must be at least 1".to_string(),
            ));
        }
        if self.max_frame_len == 0 {
            return Err(LinechatError::InvalidConfiguration(
                "max_frame_len must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_protocol_constants() {
        let config = LinkConfig::default();
        assert_eq!(config.read_chunk_size, 128);
        assert_eq!(config.max_frame_len, 1024);
        assert!(config.listens(SocketVariant::Secure));
        assert!(config.listens(SocketVariant::Insecure));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_sizes_are_rejected() {
        let config = LinkConfig {
            read_chunk_size: 0,
            ..LinkConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(LinechatError::InvalidConfiguration(_))
        ));

        let config = LinkConfig {
            max_frame_len: 0,
            ..LinkConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
