//! SMS transports.
//!
//! [`Transport`] is the concrete type handed to the dispatcher; it
//! delegates to either the log transport (development) or Twilio
//! (production), per the `[transport]` config section.

use std::time::Duration;

use anyhow::Context as _;
use vigil_core::dispatch::{SendError, SendOutcome, SmsTransport};

use crate::config::TransportConfig;

pub enum Transport {
  Log(LogTransport),
  Twilio(TwilioTransport),
}

impl Transport {
  pub fn from_config(cfg: TransportConfig) -> anyhow::Result<Self> {
    Ok(match cfg {
      TransportConfig::Log => Self::Log(LogTransport),
      TransportConfig::Twilio {
        account_sid,
        auth_token,
        from_number,
      } => Self::Twilio(TwilioTransport::new(
        account_sid,
        auth_token,
        from_number,
      )?),
    })
  }
}

impl SmsTransport for Transport {
  async fn send(&self, to: &str, body: &str) -> Result<SendOutcome, SendError> {
    match self {
      Self::Log(t) => t.send(to, body).await,
      Self::Twilio(t) => t.send(to, body).await,
    }
  }
}

// ─── Log ─────────────────────────────────────────────────────────────────────

/// Writes each message to the log and reports it as accepted.
pub struct LogTransport;

impl SmsTransport for LogTransport {
  async fn send(&self, to: &str, body: &str) -> Result<SendOutcome, SendError> {
    tracing::info!(%to, %body, "log transport: message not actually sent");
    Ok(SendOutcome { to: to.to_string() })
  }
}

// ─── Twilio ──────────────────────────────────────────────────────────────────

/// Submits messages through the Twilio REST API.
pub struct TwilioTransport {
  client:      reqwest::Client,
  account_sid: String,
  auth_token:  String,
  from_number: String,
}

impl TwilioTransport {
  pub fn new(
    account_sid: String,
    auth_token: String,
    from_number: String,
  ) -> anyhow::Result<Self> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build http client")?;
    Ok(Self { client, account_sid, auth_token, from_number })
  }
}

impl SmsTransport for TwilioTransport {
  async fn send(&self, to: &str, body: &str) -> Result<SendOutcome, SendError> {
    let url = format!(
      "https://api.twilio.com/2010-04-01/Accounts/{}/Messages.json",
      self.account_sid
    );

    let response = self
      .client
      .post(&url)
      .basic_auth(&self.account_sid, Some(&self.auth_token))
      .form(&[("To", to), ("From", &self.from_number), ("Body", body)])
      .send()
      .await
      .map_err(|e| SendError {
        to:     to.to_string(),
        reason: format!("request failed: {e}"),
      })?;

    let status = response.status();
    if !status.is_success() {
      let detail = response.text().await.unwrap_or_default();
      return Err(SendError {
        to:     to.to_string(),
        reason: format!("twilio returned {status}: {detail}"),
      });
    }

    Ok(SendOutcome { to: to.to_string() })
  }
}
