/// Outcome of the navigation guard (`SessionClient::resolve_session`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// A session is live (already local, or adopted from the provider);
    /// proceed to the target.
    Authenticated,
    /// No session exists and the target does not require one.
    Anonymous,
    /// No session exists and the target requires one; the embedder should
    /// navigate to sign-in carrying the original target.
    RedirectToSignIn {
        /// The originally requested path, to return to after sign-in.
        redirect: String,
    },
}
