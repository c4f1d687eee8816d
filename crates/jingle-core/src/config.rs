//! Session peer configuration
//!
//! # Example
//!
//! ```rust
//! use rvoip_jingle_core::PeerConfig;
//!
//! let config = PeerConfig::new("juliet@capulet.lit/balcony")
//!     .with_send_ringing(false);
//!
//! assert_eq!(config.local_address, "juliet@capulet.lit/balcony");
//! assert!(!config.send_ringing);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{JingleError, Result};

/// Settings shared by the session peers of one account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeerConfig {
    /// Our own address, used as `from` on messages we originate
    pub local_address: String,

    /// Answer an accepted remote offer with a ringing session-info
    pub send_ringing: bool,

    /// Prefix of the reason reported when a peer moves to FAILED
    pub failure_reason_prefix: String,
}

impl Default for PeerConfig {
    fn default() -> Self {
        Self {
            local_address: "anonymous@localhost".to_string(),
            send_ringing: true,
            failure_reason_prefix: "Error: ".to_string(),
        }
    }
}

impl PeerConfig {
    /// Create a configuration for the given local address
    pub fn new(local_address: impl Into<String>) -> Self {
        Self {
            local_address: local_address.into(),
            ..Default::default()
        }
    }

    /// Load a configuration from YAML; missing keys take their defaults
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| JingleError::config(format!("invalid peer config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_send_ringing(mut self, send_ringing: bool) -> Self {
        self.send_ringing = send_ringing;
        self
    }

    pub fn with_failure_reason_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.failure_reason_prefix = prefix.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.local_address.trim().is_empty() {
            return Err(JingleError::config("local_address must not be empty"));
        }
        Ok(())
    }
}
