//! Server configuration, read from `config.toml` and `VIGIL_*` environment
//! variables.
//!
//! ```toml
//! host       = "0.0.0.0"
//! port       = 8080
//! store_path = "~/.local/share/vigil/vigil.db"
//! seed_demo  = true
//!
//! [transport]
//! mode        = "twilio"
//! account_sid = "AC…"
//! auth_token  = "…"
//! from_number = "+15005550006"
//! ```

use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
  /// Seed an example zone and admin user into an empty store at startup.
  #[serde(default)]
  pub seed_demo:  bool,
  #[serde(default)]
  pub transport:  TransportConfig,
}

/// Which SMS transport to dispatch alerts through. `log` writes each
/// message to the log instead of sending it; useful for development.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum TransportConfig {
  #[default]
  Log,
  Twilio {
    account_sid: String,
    auth_token:  String,
    from_number: String,
  },
}

fn default_host() -> String {
  "0.0.0.0".to_string()
}

fn default_port() -> u16 {
  8080
}

fn default_store_path() -> PathBuf {
  PathBuf::from("vigil.db")
}
