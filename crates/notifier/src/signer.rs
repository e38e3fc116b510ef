//! Webhook request signing.
//!
//! Both providers sign the string `"{timestamp}\n{secret}"` with HMAC-SHA256
//! keyed by the secret and base64-encode the digest. They differ in clock
//! precision and in how the token travels:
//!
//! - DingTalk: epoch milliseconds, token percent-encoded into the URL query.
//! - Feishu: epoch seconds, token sent as-is in the JSON body.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use checkin_common::error::{NotifyError, NotifyResult};

type HmacSha256 = Hmac<Sha256>;

/// A timestamp and the signature computed for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub timestamp: String,
    pub sign: String,
}

/// HMAC-SHA256 of `"{timestamp}\n{secret}"` keyed by `secret`, base64-encoded.
pub fn hmac_sign(timestamp: &str, secret: &str) -> NotifyResult<String> {
    let string_to_sign = format!("{}\n{}", timestamp, secret);
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| NotifyError::Signing(e.to_string()))?;
    mac.update(string_to_sign.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// DingTalk signature: millisecond timestamp, percent-encoded token.
pub fn sign_dingtalk(timestamp_ms: i64, secret: &str) -> NotifyResult<Signature> {
    let timestamp = timestamp_ms.to_string();
    let sign = hmac_sign(&timestamp, secret)?;
    Ok(Signature {
        sign: urlencoding::encode(&sign).into_owned(),
        timestamp,
    })
}

/// Feishu signature: second timestamp, plain base64 token.
pub fn sign_feishu(timestamp_secs: i64, secret: &str) -> NotifyResult<Signature> {
    let timestamp = timestamp_secs.to_string();
    let sign = hmac_sign(&timestamp, secret)?;
    Ok(Signature { timestamp, sign })
}
