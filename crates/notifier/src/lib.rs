//! Check-in report delivery to group-chat webhooks.
//!
//! Each provider module turns a batch of [`CheckinResult`]s into a message,
//! signs it when a secret is configured and posts it through the shared
//! [`transport::Notifier`]:
//!
//! - [`dingtalk`]: markdown tables, URL-query signature.
//! - [`feishu`]: interactive card or flat text, body-field signature.
//!
//! Sending never fails loudly: every `send_*` returns `false` and logs the
//! cause when the webhook is missing, unreachable, or rejects the message.
//!
//! [`CheckinResult`]: checkin_common::types::CheckinResult

pub mod dingtalk;
pub mod feishu;
pub mod fixtures;
pub mod report;
pub mod signer;
pub mod transport;

pub use dingtalk::DingTalkNotifier;
pub use feishu::FeishuNotifier;
pub use report::format_quota;
pub use transport::{Notifier, Provider};
