//! Outbound email seam.

use tracing::info;

/// Sends transactional email. Returns `false` on delivery failure; the
/// caller decides whether that aborts the request (verification and
/// reset mails do, invite mails do too).
pub trait EmailSender: Send + Sync {
    fn send(&self, to: &str, subject: &str, html_body: &str) -> bool;
}

/// Logs mail instead of sending it. The default transport for dev and
/// tests.
#[derive(Debug, Default)]
pub struct LogMailer;

impl EmailSender for LogMailer {
    fn send(&self, to: &str, subject: &str, html_body: &str) -> bool {
        info!(to, subject, body_len = html_body.len(), "email dispatched");
        true
    }
}

/// Always fails. Lets tests exercise the dependency-failure path.
#[derive(Debug, Default)]
pub struct FailingMailer;

impl EmailSender for FailingMailer {
    fn send(&self, to: &str, _subject: &str, _html_body: &str) -> bool {
        info!(to, "email transport unavailable");
        false
    }
}
