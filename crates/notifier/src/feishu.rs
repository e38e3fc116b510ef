//! Feishu (Lark) custom bot.
//!
//! Reports go out either as an interactive card or as flat text. With
//! signature verification enabled the bot expects `timestamp` (epoch
//! seconds) and `sign` as top-level fields of the JSON body, and it
//! replies `{"code": 0, "msg": "success"}` on success.

use chrono::{DateTime, Utc};
use serde_json::{Value, json};

use checkin_common::config::{FeishuMessageFormat, NotifierConfig, WebhookConfig};
use checkin_common::error::NotifyResult;
use checkin_common::types::{CheckinResult, ProviderKind};

use crate::report::{
    CheckinReport, Outcome, REPORT_TITLE, SESSION_WARNING, format_reward, marked_failure_reason,
    now_execution_time,
};
use crate::signer::{Signature, sign_feishu};
use crate::transport::{Notifier, Provider, check_status_reply};

/// Feishu wire conventions.
#[derive(Debug, Clone, Copy, Default)]
pub struct Feishu;

impl Provider for Feishu {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Feishu
    }

    fn sign(&self, secret: &str, now: DateTime<Utc>) -> NotifyResult<Signature> {
        sign_feishu(now.timestamp(), secret)
    }

    fn attach_signature(
        &self,
        webhook_url: &str,
        payload: &mut Value,
        signature: Signature,
    ) -> String {
        if let Some(body) = payload.as_object_mut() {
            body.insert("timestamp".to_string(), Value::String(signature.timestamp));
            body.insert("sign".to_string(), Value::String(signature.sign));
        }
        webhook_url.to_string()
    }

    fn check_response(&self, body: &[u8]) -> NotifyResult<()> {
        check_status_reply(ProviderKind::Feishu, body, "code", "msg")
    }
}

pub type FeishuNotifier = Notifier<Feishu>;

impl Notifier<Feishu> {
    pub fn new(config: WebhookConfig) -> Self {
        Notifier::from_provider(Feishu, config)
    }

    pub async fn send_text(&self, content: &str) -> bool {
        self.send(text_payload(content)).await
    }

    /// Send an interactive card (the `card` object, without the envelope).
    pub async fn send_card(&self, card: Value) -> bool {
        self.send(card_payload(card)).await
    }
}

pub fn text_payload(content: &str) -> Value {
    json!({
        "msg_type": "text",
        "content": { "text": content },
    })
}

pub fn card_payload(card: Value) -> Value {
    json!({
        "msg_type": "interactive",
        "card": card,
    })
}

/// Header color for the card: green, red, or orange for a mixed batch.
pub fn header_template(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::AllSuccess => "green",
        Outcome::AllFailure => "red",
        Outcome::Mixed => "orange",
    }
}

fn success_line(result: &CheckinResult) -> String {
    let reward = format_reward(result.quota_awarded);
    match result.checkin_count {
        Some(n) if n > 0 => format!("{}，本月已签 {} 天", reward, n),
        _ => format!("{}，{}", reward, result.message.as_deref().unwrap_or("成功")),
    }
}

/// Flat text report.
pub fn build_checkin_report(results: &[CheckinResult], execution_time: &str) -> String {
    let report = CheckinReport::new(results);

    let mut lines = vec![
        REPORT_TITLE.to_string(),
        format!("执行时间: {}", execution_time),
        String::new(),
        format!("成功: {} 个", report.successes().len()),
    ];
    for r in report.successes() {
        lines.push(format!("- {}: {}", r.display_name(), success_line(r)));
    }

    lines.push(String::new());
    lines.push(format!("失败: {} 个", report.failures().len()));
    for r in report.failures() {
        lines.push(format!("- {}: {}", r.display_name(), marked_failure_reason(r)));
    }

    lines.push(String::new());
    lines.push(format!("汇总: {}", report.summary_line()));

    if report.has_expired_sessions() {
        lines.push(String::new());
        lines.push(format!("⚠️ 注意: {}", SESSION_WARNING));
    }

    lines.join("\n")
}

fn lark_md_div(content: String) -> Value {
    json!({
        "tag": "div",
        "text": { "tag": "lark_md", "content": content },
    })
}

/// Interactive card report (the `card` object).
pub fn build_checkin_card(results: &[CheckinResult], execution_time: &str) -> Value {
    let report = CheckinReport::new(results);

    let mut elements = vec![
        json!({
            "tag": "div",
            "fields": [
                {
                    "is_short": true,
                    "text": {
                        "tag": "lark_md",
                        "content": format!("**执行时间**\n{}", execution_time),
                    },
                },
                {
                    "is_short": true,
                    "text": {
                        "tag": "lark_md",
                        "content": format!("**账号数量**\n{}", report.total()),
                    },
                },
            ],
        }),
        json!({ "tag": "hr" }),
    ];

    if !report.successes().is_empty() {
        let mut content = format!("**✅ 成功 ({}个)**", report.successes().len());
        for r in report.successes() {
            content.push_str(&format!("\n- **{}**: {}", r.display_name(), success_line(r)));
        }
        elements.push(lark_md_div(content));
    }

    if !report.failures().is_empty() {
        let mut content = format!("**❌ 失败 ({}个)**", report.failures().len());
        for r in report.failures() {
            content.push_str(&format!(
                "\n- **{}**: {}",
                r.display_name(),
                marked_failure_reason(r)
            ));
        }
        elements.push(lark_md_div(content));
    }

    if report.has_expired_sessions() {
        elements.push(lark_md_div(format!("⚠️ **注意**: {}", SESSION_WARNING)));
    }

    elements.push(json!({ "tag": "hr" }));
    elements.push(json!({
        "tag": "note",
        "elements": [
            { "tag": "plain_text", "content": format!("汇总: {}", report.summary_line()) },
        ],
    }));

    json!({
        "config": { "wide_screen_mode": true },
        "header": {
            "template": header_template(report.outcome()),
            "title": { "tag": "plain_text", "content": format!("📋 {}", REPORT_TITLE) },
        },
        "elements": elements,
    })
}

/// Send the check-in report using `FEISHU_WEBHOOK` / `FEISHU_SECRET` / `FEISHU_MSG_TYPE`.
pub async fn send_checkin_notification(
    results: &[CheckinResult],
    execution_time: Option<&str>,
) -> bool {
    let config = NotifierConfig::from_env();
    send_checkin_notification_with(
        config.feishu.as_ref(),
        config.feishu_format,
        results,
        execution_time,
    )
    .await
}

/// Send the check-in report to an explicit webhook. `None` skips.
pub async fn send_checkin_notification_with(
    config: Option<&WebhookConfig>,
    format: FeishuMessageFormat,
    results: &[CheckinResult],
    execution_time: Option<&str>,
) -> bool {
    let Some(config) = config else {
        tracing::info!(provider = "feishu", "FEISHU_WEBHOOK not set, skipping notification");
        return false;
    };

    let execution_time = execution_time
        .map(str::to_string)
        .unwrap_or_else(now_execution_time);
    let notifier = FeishuNotifier::new(config.clone());

    match format {
        FeishuMessageFormat::Interactive => {
            notifier
                .send_card(build_checkin_card(results, &execution_time))
                .await
        }
        FeishuMessageFormat::Text => {
            notifier
                .send_text(&build_checkin_report(results, &execution_time))
                .await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sample_results;
    use checkin_common::error::NotifyError;
    use chrono::TimeZone;

    const TIME: &str = "2026-01-15 08:00:00";

    fn element_contents(card: &Value) -> Vec<String> {
        card["elements"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|e| e["text"]["content"].as_str().map(str::to_string))
            .collect()
    }

    #[test]
    fn test_text_report_layout() {
        let report = build_checkin_report(&sample_results(), TIME);
        let expected = [
            "NewAPI 签到报告",
            "执行时间: 2026-01-15 08:00:00",
            "",
            "成功: 2 个",
            "- 主力站: +500.00K，本月已签 15 天",
            "- 备用站: +100.00K，本月已签 8 天",
            "",
            "失败: 1 个",
            "- 测试站: ⚠️ Session 已过期",
            "",
            "汇总: 成功 2，失败 1",
            "",
            "⚠️ 注意: 部分账号 Session 已失效，请及时更新 Cookie！",
        ]
        .join("\n");
        assert_eq!(report, expected);
    }

    #[test]
    fn test_text_report_without_count_uses_message() {
        let results = vec![CheckinResult::succeeded("a", "今日已签到")];
        let report = build_checkin_report(&results, TIME);
        assert!(report.contains("- a: -，今日已签到"));
        assert!(report.contains("失败: 0 个"));
        assert!(report.contains("汇总: 全部成功 ✨ (1/1)"));
        assert!(!report.contains("注意"));
    }

    #[test]
    fn test_card_header_colors() {
        let ok = vec![CheckinResult::succeeded("a", "ok")];
        let bad = vec![CheckinResult::failed("a", "boom")];
        assert_eq!(build_checkin_card(&ok, TIME)["header"]["template"], "green");
        assert_eq!(build_checkin_card(&bad, TIME)["header"]["template"], "red");
        assert_eq!(
            build_checkin_card(&sample_results(), TIME)["header"]["template"],
            "orange"
        );
    }

    #[test]
    fn test_card_structure() {
        let card = build_checkin_card(&sample_results(), TIME);
        assert_eq!(card["header"]["title"]["content"], "📋 NewAPI 签到报告");

        let meta = &card["elements"][0];
        assert_eq!(meta["tag"], "div");
        assert_eq!(
            meta["fields"][0]["text"]["content"],
            "**执行时间**\n2026-01-15 08:00:00"
        );
        assert_eq!(meta["fields"][1]["text"]["content"], "**账号数量**\n3");

        let contents = element_contents(&card);
        assert_eq!(
            contents,
            vec![
                concat!(
                    "**✅ 成功 (2个)**\n",
                    "- **主力站**: +500.00K，本月已签 15 天\n",
                    "- **备用站**: +100.00K，本月已签 8 天"
                )
                .to_string(),
                "**❌ 失败 (1个)**\n- **测试站**: ⚠️ Session 已过期".to_string(),
                "⚠️ **注意**: 部分账号 Session 已失效，请及时更新 Cookie！".to_string(),
            ]
        );

        let elements = card["elements"].as_array().unwrap();
        let note = elements.last().unwrap();
        assert_eq!(note["tag"], "note");
        assert_eq!(note["elements"][0]["content"], "汇总: 成功 2，失败 1");
    }

    #[test]
    fn test_card_without_expired_sessions_has_no_warning() {
        let results = vec![
            CheckinResult::succeeded("a", "ok").with_quota(1_500),
            CheckinResult::failed("b", "network unreachable"),
        ];
        let card = build_checkin_card(&results, TIME);
        let contents = element_contents(&card);
        assert!(contents.iter().all(|c| !c.contains("注意")));
        assert!(contents.iter().any(|c| c.contains("- **b**: network unreachable")));
        assert!(contents.iter().any(|c| c.contains("+1.50K")));
    }

    #[test]
    fn test_card_is_idempotent() {
        let results = sample_results();
        assert_eq!(
            build_checkin_card(&results, TIME),
            build_checkin_card(&results, TIME)
        );
    }

    #[test]
    fn test_payload_envelopes() {
        let text = text_payload("hello");
        assert_eq!(text, json!({"msg_type": "text", "content": {"text": "hello"}}));

        let card = card_payload(json!({"elements": []}));
        assert_eq!(card["msg_type"], "interactive");
        assert_eq!(card["card"]["elements"], json!([]));
    }

    #[test]
    fn test_signature_goes_into_body() {
        let notifier = Notifier::with_client(
            Feishu,
            WebhookConfig::new(
                "https://open.feishu.cn/open-apis/bot/v2/hook/x",
                Some("secret".to_string()),
            ),
            None,
        );
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let (url, body) = notifier.prepare(text_payload("hi"), now).unwrap();
        assert_eq!(url, "https://open.feishu.cn/open-apis/bot/v2/hook/x");
        assert_eq!(body["timestamp"], "1700000000");
        assert_eq!(body["sign"], "vli3/GfD4kJTUyxxBD82mmmq4rnrfhhcCjvn2rP9x7o=");
        assert_eq!(body["msg_type"], "text");
    }

    #[test]
    fn test_unsigned_body_has_no_signature_fields() {
        let notifier = Notifier::with_client(
            Feishu,
            WebhookConfig::new("https://open.feishu.cn/open-apis/bot/v2/hook/x", None),
            None,
        );
        let (_, body) = notifier.prepare(text_payload("hi"), Utc::now()).unwrap();
        assert!(body.get("timestamp").is_none());
        assert!(body.get("sign").is_none());
    }

    #[test]
    fn test_check_response() {
        assert!(Feishu.check_response(br#"{"code":0,"msg":"success"}"#).is_ok());

        let reply = concat!(
            r#"{"code":19021,"msg":"sign match fail or timestamp "#,
            r#"is not within one hour from current time"}"#
        );
        match Feishu.check_response(reply.as_bytes()).unwrap_err() {
            NotifyError::Provider { code, message, .. } => {
                assert_eq!(code, Some(19021));
                assert!(message.starts_with("sign match fail"));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert!(matches!(
            Feishu.check_response(b"").unwrap_err(),
            NotifyError::Json(_)
        ));

        // Arrays and scalars never count as a success reply.
        let bodies: [&[u8]; 3] = [br#"[0, "success"]"#, b"[0]", b"0"];
        for body in bodies {
            assert!(matches!(
                Feishu.check_response(body).unwrap_err(),
                NotifyError::Provider { code: None, .. }
            ));
        }
    }

    #[tokio::test]
    async fn test_unconfigured_webhook_skips() {
        assert!(
            !send_checkin_notification_with(
                None,
                FeishuMessageFormat::Interactive,
                &sample_results(),
                Some(TIME)
            )
            .await
        );
    }
}
