pub const DINGTALK_WEBHOOK: &str = "DINGTALK_WEBHOOK";
pub const DINGTALK_SECRET: &str = "DINGTALK_SECRET";
pub const FEISHU_WEBHOOK: &str = "FEISHU_WEBHOOK";
pub const FEISHU_SECRET: &str = "FEISHU_SECRET";
pub const FEISHU_MSG_TYPE: &str = "FEISHU_MSG_TYPE";

/// Webhook endpoint plus optional signing secret for one chat provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookConfig {
    /// Full webhook URL, including any access token query string
    pub webhook_url: String,

    /// Signing secret, when the bot has signature verification enabled
    pub secret: Option<String>,
}

impl WebhookConfig {
    pub fn new(webhook_url: impl Into<String>, secret: Option<String>) -> Self {
        Self {
            webhook_url: webhook_url.into(),
            secret: secret.filter(|s| !s.is_empty()),
        }
    }

    /// Build from raw variable values. An empty URL means "not configured".
    pub fn from_parts(webhook_url: Option<String>, secret: Option<String>) -> Option<Self> {
        let webhook_url = webhook_url.filter(|u| !u.trim().is_empty())?;
        Some(Self::new(webhook_url.trim(), secret))
    }
}

/// Message shape used for Feishu check-in reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FeishuMessageFormat {
    /// Interactive card with colored header
    #[default]
    Interactive,
    /// Flat text message
    Text,
}

impl FeishuMessageFormat {
    /// Parse a `FEISHU_MSG_TYPE` value; unknown values fall back to the card.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" => FeishuMessageFormat::Text,
            "interactive" | "card" | "" => FeishuMessageFormat::Interactive,
            other => {
                tracing::warn!(value = other, "Unknown FEISHU_MSG_TYPE, using interactive card");
                FeishuMessageFormat::Interactive
            }
        }
    }
}

/// Notifier configuration loaded from environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotifierConfig {
    /// DingTalk robot webhook (`DINGTALK_WEBHOOK` / `DINGTALK_SECRET`)
    pub dingtalk: Option<WebhookConfig>,

    /// Feishu bot webhook (`FEISHU_WEBHOOK` / `FEISHU_SECRET`)
    pub feishu: Option<WebhookConfig>,

    /// Feishu report shape (`FEISHU_MSG_TYPE`, default: interactive)
    pub feishu_format: FeishuMessageFormat,
}

impl NotifierConfig {
    /// Load configuration from environment variables, honoring a `.env` file.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            dingtalk: WebhookConfig::from_parts(lookup(DINGTALK_WEBHOOK), lookup(DINGTALK_SECRET)),
            feishu: WebhookConfig::from_parts(lookup(FEISHU_WEBHOOK), lookup(FEISHU_SECRET)),
            feishu_format: lookup(FEISHU_MSG_TYPE)
                .map(|v| FeishuMessageFormat::parse(&v))
                .unwrap_or_default(),
        }
    }
}
