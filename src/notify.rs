/// Message shown to the user each time a rate-limited request is retried.
pub const RATE_LIMIT_MESSAGE: &str = "Too many requests. Please wait a moment, retrying...";

/// User-facing notification sink (a toast, a status line, a log pane).
pub trait Notifier {
    /// Shows a short transient message.
    fn notify(&self, message: &str);
}

impl<F> Notifier for F
where
    F: Fn(&str),
{
    fn notify(&self, message: &str) {
        self(message)
    }
}

/// Notifier that drops every message.
///
/// For interactive call sites that have no notification channel wired yet.
#[derive(Clone, Copy, Debug, Default)]
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn notify(&self, _message: &str) {}
}
