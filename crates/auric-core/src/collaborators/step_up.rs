use crate::Client;

/// The re-authentication surface opened by the step-up protocol.
///
/// Implementations present a second-factor dialog (typically driving the
/// `aal2` login flow) and resolve with its outcome. Closing the surface
/// without completing authentication must resolve `false`, never hang.
#[async_trait::async_trait]
pub trait StepUpPrompt: std::fmt::Debug + Send + Sync {
    /// Open the surface and suspend until the user completes or cancels.
    ///
    /// The prompt's word is not final: the session manager re-checks with
    /// the provider that a fresh `aal2` session exists before the step-up
    /// resolves successfully.
    async fn authenticate(&self, client: &Client) -> bool;
}

/// Prompt that declines every step-up. Default for headless contexts,
/// where a `session_refresh_required` action simply stays unretried.
#[derive(Debug)]
pub struct DecliningStepUpPrompt;

#[async_trait::async_trait]
impl StepUpPrompt for DecliningStepUpPrompt {
    async fn authenticate(&self, _client: &Client) -> bool {
        log::debug!("step-up requested but no prompt is wired; declining");
        false
    }
}
