//! Provider-independent pieces of the check-in report.
//!
//! `CheckinReport` partitions a batch of results once and exposes the
//! summary, headline and session-expiry state that every message shape
//! shares. Provider modules only decide layout.

use checkin_common::types::CheckinResult;

/// Report title shown by every message shape.
pub const REPORT_TITLE: &str = "NewAPI 签到报告";

/// Footer text appended when any failure looks like an expired session.
pub const SESSION_WARNING: &str = "部分账号 Session 已失效，请及时更新 Cookie！";

/// Marker prefixed to failure reasons that look like an expired session.
pub const EXPIRED_MARKER: &str = "⚠️";

/// Format a quota value with `K`/`M` suffixes.
///
/// Values below 1 000 are printed verbatim.
pub fn format_quota(quota: i64) -> String {
    if quota >= 1_000_000 {
        format!("{:.2}M", quota as f64 / 1_000_000.0)
    } else if quota >= 1_000 {
        format!("{:.2}K", quota as f64 / 1_000.0)
    } else {
        quota.to_string()
    }
}

/// Reward cell: `+{quota}` for a non-zero award, `-` otherwise.
pub fn format_reward(quota: Option<i64>) -> String {
    match quota {
        Some(q) if q != 0 => format!("+{}", format_quota(q)),
        _ => "-".to_string(),
    }
}

/// Current local time in the layout used for the execution-time line.
pub fn now_execution_time() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Overall outcome of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// No failures (including the empty batch)
    AllSuccess,
    /// At least one record, none succeeded
    AllFailure,
    Mixed,
}

/// A batch of results split into successes and failures.
///
/// Both groups keep the input order.
#[derive(Debug, Clone)]
pub struct CheckinReport<'a> {
    successes: Vec<&'a CheckinResult>,
    failures: Vec<&'a CheckinResult>,
}

impl<'a> CheckinReport<'a> {
    pub fn new(results: &'a [CheckinResult]) -> Self {
        let (successes, failures): (Vec<_>, Vec<_>) = results.iter().partition(|r| r.success);
        Self {
            successes,
            failures,
        }
    }

    pub fn successes(&self) -> &[&'a CheckinResult] {
        &self.successes
    }

    pub fn failures(&self) -> &[&'a CheckinResult] {
        &self.failures
    }

    pub fn total(&self) -> usize {
        self.successes.len() + self.failures.len()
    }

    pub fn outcome(&self) -> Outcome {
        if self.failures.is_empty() {
            Outcome::AllSuccess
        } else if self.successes.is_empty() {
            Outcome::AllFailure
        } else {
            Outcome::Mixed
        }
    }

    /// Summary sentence without any markup.
    pub fn summary_line(&self) -> String {
        let total = self.total();
        match self.outcome() {
            Outcome::AllSuccess => format!("全部成功 ✨ ({}/{})", self.successes.len(), total),
            Outcome::AllFailure => format!("全部失败 ⚠️ ({}/{})", self.failures.len(), total),
            Outcome::Mixed => format!(
                "成功 {}，失败 {}",
                self.successes.len(),
                self.failures.len()
            ),
        }
    }

    /// Short title shown in the chat list preview.
    pub fn headline(&self) -> String {
        match self.outcome() {
            Outcome::AllSuccess => format!("✅ 签到成功 ({}个账号)", self.successes.len()),
            Outcome::AllFailure => format!("❌ 签到失败 ({}个账号)", self.failures.len()),
            Outcome::Mixed => format!(
                "📋 签到完成 (成功{}/失败{})",
                self.successes.len(),
                self.failures.len()
            ),
        }
    }

    pub fn has_expired_sessions(&self) -> bool {
        self.failures.iter().any(|r| r.is_session_expired())
    }
}

/// Failure reason, prefixed with the warning marker for expired sessions.
pub fn marked_failure_reason(result: &CheckinResult) -> String {
    let reason = result.failure_reason();
    if result.is_session_expired() {
        format!("{} {}", EXPIRED_MARKER, reason)
    } else {
        reason.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sample_results;

    #[test]
    fn test_format_quota() {
        assert_eq!(format_quota(999), "999");
        assert_eq!(format_quota(0), "0");
        assert_eq!(format_quota(1_000), "1.00K");
        assert_eq!(format_quota(1_500), "1.50K");
        assert_eq!(format_quota(100_000), "100.00K");
        assert_eq!(format_quota(500_000), "500.00K");
        assert_eq!(format_quota(1_000_000), "1.00M");
        assert_eq!(format_quota(2_500_000), "2.50M");
        assert_eq!(format_quota(-5), "-5");
    }

    #[test]
    fn test_format_reward() {
        assert_eq!(format_reward(Some(500_000)), "+500.00K");
        assert_eq!(format_reward(Some(42)), "+42");
        assert_eq!(format_reward(Some(0)), "-");
        assert_eq!(format_reward(None), "-");
    }

    #[test]
    fn test_partition_preserves_order() {
        let results = vec![
            CheckinResult::failed("f1", "timeout"),
            CheckinResult::succeeded("s1", "ok"),
            CheckinResult::failed("f2", "denied"),
            CheckinResult::succeeded("s2", "ok"),
        ];
        let report = CheckinReport::new(&results);

        let successes: Vec<_> = report.successes().iter().map(|r| r.display_name()).collect();
        let failures: Vec<_> = report.failures().iter().map(|r| r.display_name()).collect();
        assert_eq!(successes, vec!["s1", "s2"]);
        assert_eq!(failures, vec!["f1", "f2"]);
        assert_eq!(report.total(), 4);
    }

    #[test]
    fn test_partition_counts_fixture() {
        let results = sample_results();
        let report = CheckinReport::new(&results);
        assert_eq!(report.successes().len(), 2);
        assert_eq!(report.failures().len(), 1);
        assert_eq!(report.successes()[0].display_name(), "主力站");
        assert_eq!(report.successes()[1].display_name(), "备用站");
    }

    #[test]
    fn test_summary_all_success() {
        let results = vec![
            CheckinResult::succeeded("a", "ok"),
            CheckinResult::succeeded("b", "ok"),
        ];
        let report = CheckinReport::new(&results);
        assert_eq!(report.outcome(), Outcome::AllSuccess);
        assert_eq!(report.summary_line(), "全部成功 ✨ (2/2)");
        assert_eq!(report.headline(), "✅ 签到成功 (2个账号)");
    }

    #[test]
    fn test_summary_all_failure() {
        let results = vec![CheckinResult::failed("a", "boom")];
        let report = CheckinReport::new(&results);
        assert_eq!(report.outcome(), Outcome::AllFailure);
        assert_eq!(report.summary_line(), "全部失败 ⚠️ (1/1)");
        assert_eq!(report.headline(), "❌ 签到失败 (1个账号)");
    }

    #[test]
    fn test_summary_mixed() {
        let results = sample_results();
        let report = CheckinReport::new(&results);
        assert_eq!(report.outcome(), Outcome::Mixed);
        assert_eq!(report.summary_line(), "成功 2，失败 1");
        assert_eq!(report.headline(), "📋 签到完成 (成功2/失败1)");
    }

    #[test]
    fn test_empty_batch_counts_as_success() {
        let report = CheckinReport::new(&[]);
        assert_eq!(report.outcome(), Outcome::AllSuccess);
        assert_eq!(report.summary_line(), "全部成功 ✨ (0/0)");
        assert!(!report.has_expired_sessions());
    }

    #[test]
    fn test_expired_sessions_only_count_failures() {
        // A success whose message mentions "session" must not raise the footer.
        let results = vec![CheckinResult::succeeded("a", "session refreshed")];
        assert!(!CheckinReport::new(&results).has_expired_sessions());

        let results = vec![CheckinResult::failed("a", "Session 已过期")];
        assert!(CheckinReport::new(&results).has_expired_sessions());
    }

    #[test]
    fn test_marked_failure_reason() {
        let expired = CheckinResult::failed("a", "Session 已过期");
        assert_eq!(marked_failure_reason(&expired), "⚠️ Session 已过期");

        let other = CheckinResult::failed("a", "rate limited");
        assert_eq!(marked_failure_reason(&other), "rate limited");
    }
}
