use auric_api::models::Session;

/// Subscription to session replacement.
///
/// Observers are invoked synchronously, in subscription order, after every
/// replace or clear. This is the hook for "on session replaced, re-run
/// dependent-data refresh" style reactions; keeping it an explicit list
/// makes ordering and re-entrancy visible rather than ambient.
pub trait SessionObserver: Send + Sync {
    /// Called with the new session, or `None` when the session was cleared.
    fn session_replaced(&self, session: Option<&Session>);
}
