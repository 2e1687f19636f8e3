use crate::config::SmsProviderConfig;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Mutex;
use tracing::error;

/// Outbound SMS delivery. One call per recipient; the dispatcher treats a
/// returned error as a transient per-recipient failure.
#[async_trait::async_trait]
pub trait ISmsSender: Send + Sync {
    async fn send(&self, to: &str, body: &str) -> anyhow::Result<()>;
}

pub struct TwilioSmsSender {
    client: Client,
    account_sid: String,
    auth_token: String,
    from_number: String,
}

#[derive(Debug, Deserialize)]
struct TwilioErrorResponse {
    message: Option<String>,
    code: Option<i64>,
}

impl TwilioSmsSender {
    pub fn new(config: &SmsProviderConfig) -> Self {
        Self {
            client: Client::new(),
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
            from_number: config.from_number.clone(),
        }
    }
}

#[async_trait::async_trait]
impl ISmsSender for TwilioSmsSender {
    async fn send(&self, to: &str, body: &str) -> anyhow::Result<()> {
        let url = format!(
            "https://api.twilio.com/2010-04-01/Accounts/{}/Messages.json",
            self.account_sid
        );
        let res = self
            .client
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[
                ("To", to),
                ("From", self.from_number.as_str()),
                ("Body", body),
            ])
            .send()
            .await?;

        if res.status().is_success() {
            return Ok(());
        }

        let status = res.status();
        let err = res
            .json::<TwilioErrorResponse>()
            .await
            .unwrap_or(TwilioErrorResponse {
                message: None,
                code: None,
            });
        Err(anyhow::anyhow!(
            "SMS provider rejected message to {}: http status {}, code {:?}, message {:?}",
            to,
            status,
            err.code,
            err.message
        ))
    }
}

/// Stand-in when no provider credentials are configured. Every send fails,
/// which the dispatcher records per recipient without writing dedup rows,
/// so a later sweep retries once credentials exist.
pub struct DisabledSmsSender;

#[async_trait::async_trait]
impl ISmsSender for DisabledSmsSender {
    async fn send(&self, to: &str, _body: &str) -> anyhow::Result<()> {
        error!("SMS provider is not configured; dropping message to {}", to);
        Err(anyhow::anyhow!("SMS provider is not configured"))
    }
}

/// Test double that records sends and can simulate per-number delivery
/// failures.
#[derive(Default)]
pub struct RecordingSmsSender {
    pub sent: Mutex<Vec<(String, String)>>,
    pub failing_numbers: Mutex<HashSet<String>>,
}

impl RecordingSmsSender {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn fail_for(&self, number: &str) {
        self.failing_numbers
            .lock()
            .unwrap()
            .insert(number.to_string());
    }

    pub fn sent_to(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(to, _)| to.clone())
            .collect()
    }
}

#[async_trait::async_trait]
impl ISmsSender for RecordingSmsSender {
    async fn send(&self, to: &str, body: &str) -> anyhow::Result<()> {
        if self.failing_numbers.lock().unwrap().contains(to) {
            return Err(anyhow::anyhow!("simulated delivery failure for {}", to));
        }
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), body.to_string()));
        Ok(())
    }
}
