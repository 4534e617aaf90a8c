/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    #[allow(missing_docs)]
    Info,
    #[allow(missing_docs)]
    Error,
}

/// Side-channel for short human-readable notices (toasts or equivalent).
///
/// Unclassified provider errors always end up here; they are never
/// silently dropped.
pub trait Notifier: Send + Sync {
    #[allow(missing_docs)]
    fn notify(&self, title: &str, description: &str, kind: NoticeKind);
}

/// Notifier that only logs. Default for headless contexts.
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, title: &str, description: &str, kind: NoticeKind) {
        log::debug!("notice ({kind:?}): {title}: {description}");
    }
}
