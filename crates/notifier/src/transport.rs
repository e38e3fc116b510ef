//! Signed JSON delivery to a chat webhook.
//!
//! `Notifier<P>` owns the HTTP client and the webhook config; the
//! `Provider` implementation supplies everything that differs between chat
//! platforms (signature clock and placement, response success code).

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;

use checkin_common::config::WebhookConfig;
use checkin_common::error::{NotifyError, NotifyResult};
use checkin_common::types::{ProviderKind, UNKNOWN_ERROR};

use crate::signer::Signature;

/// Per-request timeout for webhook delivery.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Platform-specific behavior of a chat webhook.
pub trait Provider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Compute the request signature for `secret` at `now`.
    fn sign(&self, secret: &str, now: DateTime<Utc>) -> NotifyResult<Signature>;

    /// Attach a signature to the outgoing request and return the URL to post to.
    fn attach_signature(
        &self,
        webhook_url: &str,
        payload: &mut Value,
        signature: Signature,
    ) -> String;

    /// Interpret the provider's JSON reply. `Ok` means the message was accepted.
    fn check_response(&self, body: &[u8]) -> NotifyResult<()>;
}

/// Webhook sender for a single provider.
pub struct Notifier<P> {
    provider: P,
    config: WebhookConfig,
    client: Option<reqwest::Client>,
    timeout: Duration,
}

impl<P: Provider> Notifier<P> {
    pub fn from_provider(provider: P, config: WebhookConfig) -> Self {
        let client = build_client(provider.kind());
        Self::with_client(provider, config, client)
    }

    /// Build with an explicit client; `None` disables delivery.
    pub fn with_client(
        provider: P,
        config: WebhookConfig,
        client: Option<reqwest::Client>,
    ) -> Self {
        Self {
            provider,
            config,
            client,
            timeout: REQUEST_TIMEOUT,
        }
    }

    /// Override the per-request timeout (default: [`REQUEST_TIMEOUT`]).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Resolve the target URL and final body, signing when a secret is configured.
    pub fn prepare(&self, mut payload: Value, now: DateTime<Utc>) -> NotifyResult<(String, Value)> {
        let url = match self.config.secret.as_deref() {
            Some(secret) => {
                let signature = self.provider.sign(secret, now)?;
                self.provider
                    .attach_signature(&self.config.webhook_url, &mut payload, signature)
            }
            None => self.config.webhook_url.clone(),
        };
        Ok((url, payload))
    }

    /// Deliver `payload`, logging the outcome. Never fails; returns whether
    /// the provider accepted the message.
    pub async fn send(&self, payload: Value) -> bool {
        let provider = self.provider.kind();
        match self.try_send(payload).await {
            Ok(()) => {
                tracing::info!(provider = %provider, "Notification delivered");
                true
            }
            Err(NotifyError::Provider { code, message, .. }) => {
                tracing::warn!(
                    provider = %provider,
                    ?code,
                    detail = %message,
                    "Provider rejected notification"
                );
                false
            }
            Err(e) => {
                tracing::error!(provider = %provider, error = %e, "Notification delivery failed");
                false
            }
        }
    }

    /// Deliver `payload`, surfacing the failure cause.
    pub async fn try_send(&self, payload: Value) -> NotifyResult<()> {
        let client = self.client.as_ref().ok_or_else(|| {
            NotifyError::ClientUnavailable(format!(
                "no HTTP client for {} webhook",
                self.provider.kind()
            ))
        })?;

        let (url, body) = self.prepare(payload, Utc::now())?;

        let response = client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .timeout(self.timeout)
            .body(serde_json::to_vec(&body)?)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;
        tracing::debug!(
            provider = %self.provider.kind(),
            status = status.as_u16(),
            "Webhook responded"
        );

        self.provider.check_response(&bytes)
    }
}

/// Build the shared HTTP client, or `None` if the platform cannot provide one
/// (for example when the TLS backend fails to initialize).
fn build_client(provider: ProviderKind) -> Option<reqwest::Client> {
    match reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build() {
        Ok(client) => Some(client),
        Err(e) => {
            tracing::error!(
                provider = %provider,
                error = %e,
                "HTTP client unavailable, notifications disabled"
            );
            None
        }
    }
}

/// Read a `{<code_key>: int, <message_key>: string}` status reply.
///
/// Only an object whose code is exactly 0 counts as accepted; anything else,
/// including a non-object JSON value, is a provider rejection.
pub fn check_status_reply(
    provider: ProviderKind,
    body: &[u8],
    code_key: &str,
    message_key: &str,
) -> NotifyResult<()> {
    let reply: Value = serde_json::from_slice(body)?;
    let Some(fields) = reply.as_object() else {
        return Err(NotifyError::Provider {
            provider,
            code: None,
            message: format!("unexpected reply: {}", reply),
        });
    };

    match fields.get(code_key).and_then(Value::as_i64) {
        Some(0) => Ok(()),
        code => Err(NotifyError::Provider {
            provider,
            code,
            message: fields
                .get(message_key)
                .and_then(Value::as_str)
                .unwrap_or(UNKNOWN_ERROR)
                .to_string(),
        }),
    }
}

/// Append query parameters to a URL that may already carry a query string.
pub fn append_query(url: &str, params: &[(&str, &str)]) -> String {
    let mut out = url.to_string();
    for (key, value) in params {
        out.push(if out.contains('?') { '&' } else { '?' });
        out.push_str(key);
        out.push('=');
        out.push_str(value);
    }
    out
}
