//! Manual self-test: render sample reports for both providers and send them
//! to every webhook configured in the environment.
//!
//! ```bash
//! DINGTALK_WEBHOOK="https://oapi.dingtalk.com/robot/send?access_token=..." \
//! DINGTALK_SECRET="SEC..." \
//!   cargo run -p checkin-notifier -- [results.json]
//! ```

use std::path::Path;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use checkin_common::config::NotifierConfig;
use checkin_common::types::CheckinResult;

use checkin_notifier::fixtures::sample_results;
use checkin_notifier::report::now_execution_time;
use checkin_notifier::{dingtalk, feishu};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("checkin_notifier=info")),
        )
        .init();

    let results = match std::env::args().nth(1) {
        Some(path) => load_results(Path::new(&path))?,
        None => sample_results(),
    };
    let config = NotifierConfig::from_env();
    let execution_time = now_execution_time();

    println!("=== DingTalk markdown ===");
    println!("{}", dingtalk::build_checkin_report(&results, &execution_time));
    println!();
    println!("=== Feishu text ===");
    println!("{}", feishu::build_checkin_report(&results, &execution_time));
    println!();
    println!("=== Feishu card ===");
    println!(
        "{}",
        serde_json::to_string_pretty(&feishu::build_checkin_card(&results, &execution_time))?
    );
    println!("===================");

    if config.dingtalk.is_none() && config.feishu.is_none() {
        println!("\nSet DINGTALK_WEBHOOK and/or FEISHU_WEBHOOK to send the report.");
        return Ok(());
    }

    let (dingtalk_sent, feishu_sent) = tokio::join!(
        dingtalk::send_checkin_notification_with(
            config.dingtalk.as_ref(),
            &results,
            Some(execution_time.as_str())
        ),
        feishu::send_checkin_notification_with(
            config.feishu.as_ref(),
            config.feishu_format,
            &results,
            Some(execution_time.as_str())
        ),
    );

    tracing::info!(dingtalk = dingtalk_sent, feishu = feishu_sent, "Self-test finished");
    Ok(())
}

fn load_results(path: &Path) -> anyhow::Result<Vec<CheckinResult>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let results: Vec<CheckinResult> = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON array of check-in results", path.display()))?;
    tracing::info!(count = results.len(), path = %path.display(), "Loaded check-in results");
    Ok(results)
}
