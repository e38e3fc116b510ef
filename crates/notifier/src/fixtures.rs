//! Sample check-in batch used by the self-test binary and the tests.

use checkin_common::types::CheckinResult;

/// Two successful accounts and one with an expired session.
pub fn sample_results() -> Vec<CheckinResult> {
    vec![
        CheckinResult::succeeded("主力站", "签到成功")
            .with_quota(500_000)
            .with_checkin_count(15),
        CheckinResult::succeeded("备用站", "签到成功")
            .with_quota(100_000)
            .with_checkin_count(8),
        CheckinResult::failed("测试站", "Session 已过期").with_session_expired(true),
    ]
}
