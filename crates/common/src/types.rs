use serde::{Deserialize, Serialize};

/// Placeholder shown when a record carries no account name.
pub const UNKNOWN_ACCOUNT: &str = "未知账号";

/// Placeholder shown when a failed record carries no message.
pub const UNKNOWN_ERROR: &str = "未知错误";

/// Supported chat providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    DingTalk,
    Feishu,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::DingTalk => write!(f, "dingtalk"),
            ProviderKind::Feishu => write!(f, "feishu"),
        }
    }
}

/// Outcome of a single account check-in, as produced by the check-in engine.
///
/// Records are read-only to the notifier; every report builder borrows them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckinResult {
    /// Account display name
    #[serde(default)]
    pub name: Option<String>,
    /// Whether the check-in succeeded
    #[serde(default)]
    pub success: bool,
    /// Result or failure message
    #[serde(default)]
    pub message: Option<String>,
    /// Reward granted by the check-in, in raw quota units
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quota_awarded: Option<i64>,
    /// Days checked in during the current month
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkin_count: Option<u32>,
    /// Set by the check-in engine when the account session is no longer valid
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_expired: Option<bool>,
}

impl CheckinResult {
    /// A successful check-in with no reward details.
    pub fn succeeded(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            success: true,
            message: Some(message.into()),
            ..Default::default()
        }
    }

    /// A failed check-in.
    pub fn failed(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            success: false,
            message: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn with_quota(mut self, quota: i64) -> Self {
        self.quota_awarded = Some(quota);
        self
    }

    pub fn with_checkin_count(mut self, count: u32) -> Self {
        self.checkin_count = Some(count);
        self
    }

    pub fn with_session_expired(mut self, expired: bool) -> Self {
        self.session_expired = Some(expired);
        self
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(UNKNOWN_ACCOUNT)
    }

    /// Message for a failure row, falling back to the unknown-error placeholder.
    pub fn failure_reason(&self) -> &str {
        self.message.as_deref().unwrap_or(UNKNOWN_ERROR)
    }

    /// Whether this record points at an expired or invalid login session.
    ///
    /// Matches the explicit flag, a case-insensitive `session` in the message,
    /// or the `认证` / `过期` keywords emitted by Chinese-language backends.
    pub fn is_session_expired(&self) -> bool {
        if self.session_expired.unwrap_or(false) {
            return true;
        }
        let message = self.message.as_deref().unwrap_or_default();
        message.to_lowercase().contains("session")
            || message.contains("认证")
            || message.contains("过期")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_expired_explicit_flag() {
        let r = CheckinResult::failed("a", "boom").with_session_expired(true);
        assert!(r.is_session_expired());
    }

    #[test]
    fn test_session_expired_keywords() {
        assert!(CheckinResult::failed("a", "Session 已过期").is_session_expired());
        assert!(CheckinResult::failed("a", "invalid SESSION cookie").is_session_expired());
        assert!(CheckinResult::failed("a", "认证失败").is_session_expired());
        assert!(CheckinResult::failed("a", "令牌过期").is_session_expired());
    }

    #[test]
    fn test_session_expired_unrelated_message() {
        let r = CheckinResult::failed("a", "connection reset");
        assert!(!r.is_session_expired());
        assert!(!CheckinResult::default().is_session_expired());
    }

    #[test]
    fn test_placeholders() {
        let r = CheckinResult::default();
        assert_eq!(r.display_name(), UNKNOWN_ACCOUNT);
        assert_eq!(r.failure_reason(), UNKNOWN_ERROR);
    }

    #[test]
    fn test_deserialize_partial_record() {
        let r: CheckinResult = serde_json::from_value(serde_json::json!({
            "name": "主力站",
            "success": true,
            "quota_awarded": 500000
        }))
        .unwrap();
        assert_eq!(r.display_name(), "主力站");
        assert!(r.success);
        assert_eq!(r.quota_awarded, Some(500000));
        assert_eq!(r.checkin_count, None);
    }

    #[test]
    fn test_provider_kind_display() {
        assert_eq!(ProviderKind::DingTalk.to_string(), "dingtalk");
        assert_eq!(ProviderKind::Feishu.to_string(), "feishu");
    }
}
