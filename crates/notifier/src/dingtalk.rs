//! DingTalk group robot.
//!
//! Messages go out as `text` or `markdown`. When the robot has signing
//! enabled, `timestamp` (epoch ms) and `sign` are appended to the webhook
//! URL. The robot replies with `{"errcode": 0, "errmsg": "ok"}` on success.

use chrono::{DateTime, Utc};
use serde_json::{Value, json};

use checkin_common::config::{NotifierConfig, WebhookConfig};
use checkin_common::error::NotifyResult;
use checkin_common::types::{CheckinResult, ProviderKind};

use crate::report::{
    CheckinReport, REPORT_TITLE, SESSION_WARNING, format_reward, marked_failure_reason,
    now_execution_time,
};
use crate::signer::{Signature, sign_dingtalk};
use crate::transport::{Notifier, Provider, append_query, check_status_reply};

/// DingTalk wire conventions.
#[derive(Debug, Clone, Copy, Default)]
pub struct DingTalk;

impl Provider for DingTalk {
    fn kind(&self) -> ProviderKind {
        ProviderKind::DingTalk
    }

    fn sign(&self, secret: &str, now: DateTime<Utc>) -> NotifyResult<Signature> {
        sign_dingtalk(now.timestamp_millis(), secret)
    }

    fn attach_signature(
        &self,
        webhook_url: &str,
        _payload: &mut Value,
        signature: Signature,
    ) -> String {
        append_query(
            webhook_url,
            &[
                ("timestamp", signature.timestamp.as_str()),
                ("sign", signature.sign.as_str()),
            ],
        )
    }

    fn check_response(&self, body: &[u8]) -> NotifyResult<()> {
        check_status_reply(ProviderKind::DingTalk, body, "errcode", "errmsg")
    }
}

/// Who to mention in a DingTalk message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AtTargets {
    pub mobiles: Vec<String>,
    pub all: bool,
}

impl AtTargets {
    fn to_json(&self) -> Value {
        json!({
            "atMobiles": self.mobiles,
            "isAtAll": self.all,
        })
    }
}

pub type DingTalkNotifier = Notifier<DingTalk>;

impl Notifier<DingTalk> {
    pub fn new(config: WebhookConfig) -> Self {
        Notifier::from_provider(DingTalk, config)
    }

    pub async fn send_text(&self, content: &str, at: &AtTargets) -> bool {
        self.send(text_payload(content, at)).await
    }

    pub async fn send_markdown(&self, title: &str, text: &str, at: &AtTargets) -> bool {
        self.send(markdown_payload(title, text, at)).await
    }
}

pub fn text_payload(content: &str, at: &AtTargets) -> Value {
    json!({
        "msgtype": "text",
        "text": { "content": content },
        "at": at.to_json(),
    })
}

pub fn markdown_payload(title: &str, text: &str, at: &AtTargets) -> Value {
    json!({
        "msgtype": "markdown",
        "markdown": { "title": title, "text": text },
        "at": at.to_json(),
    })
}

/// Markdown report with success and failure tables.
pub fn build_checkin_report(results: &[CheckinResult], execution_time: &str) -> String {
    let report = CheckinReport::new(results);

    let mut lines = vec![
        format!("# 📋 {}", REPORT_TITLE),
        String::new(),
        format!("**执行时间**: {}", execution_time),
        String::new(),
        "---".to_string(),
        String::new(),
    ];

    if !report.successes().is_empty() {
        lines.push(format!("## ✅ 成功 ({}个)", report.successes().len()));
        lines.push(String::new());
        lines.push("| 账号 | 奖励 | 详情 |".to_string());
        lines.push("|------|------|------|".to_string());
        for r in report.successes() {
            lines.push(format!(
                "| {} | {} | {} |",
                r.display_name(),
                format_reward(r.quota_awarded),
                success_detail(r)
            ));
        }
        lines.push(String::new());
    }

    if !report.failures().is_empty() {
        lines.push(format!("## ❌ 失败 ({}个)", report.failures().len()));
        lines.push(String::new());
        lines.push("| 账号 | 原因 |".to_string());
        lines.push("|------|------|".to_string());
        for r in report.failures() {
            lines.push(format!(
                "| {} | {} |",
                r.display_name(),
                marked_failure_reason(r)
            ));
        }
        lines.push(String::new());
    }

    lines.push("---".to_string());
    lines.push(String::new());
    lines.push(format!("**汇总**: {}", report.summary_line()));

    if report.has_expired_sessions() {
        lines.push(String::new());
        lines.push(format!("> ⚠️ **注意**: {}", SESSION_WARNING));
    }

    lines.join("\n")
}

fn success_detail(result: &CheckinResult) -> String {
    match result.checkin_count {
        Some(n) if n > 0 => format!("已签 {} 天", n),
        _ => result.message.clone().unwrap_or_else(|| "成功".to_string()),
    }
}

/// Send the markdown check-in report using `DINGTALK_WEBHOOK` / `DINGTALK_SECRET`.
pub async fn send_checkin_notification(
    results: &[CheckinResult],
    execution_time: Option<&str>,
) -> bool {
    let config = NotifierConfig::from_env();
    send_checkin_notification_with(config.dingtalk.as_ref(), results, execution_time).await
}

/// Send the markdown check-in report to an explicit webhook. `None` skips.
pub async fn send_checkin_notification_with(
    config: Option<&WebhookConfig>,
    results: &[CheckinResult],
    execution_time: Option<&str>,
) -> bool {
    let Some(config) = config else {
        tracing::info!(provider = "dingtalk", "DINGTALK_WEBHOOK not set, skipping notification");
        return false;
    };

    let execution_time = execution_time
        .map(str::to_string)
        .unwrap_or_else(now_execution_time);
    let report = build_checkin_report(results, &execution_time);
    let title = CheckinReport::new(results).headline();

    DingTalkNotifier::new(config.clone())
        .send_markdown(&title, &report, &AtTargets::default())
        .await
}
