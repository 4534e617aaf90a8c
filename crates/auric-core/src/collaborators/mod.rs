//! Seams the embedding application fills in.
//!
//! The SDK never renders UI or owns routing; it talks to these traits.
//! Every trait ships a no-op implementation so headless contexts work
//! without wiring.

mod navigator;
mod notifier;
mod profile_store;
mod step_up;

use std::sync::Arc;

pub use navigator::{Navigator, NullNavigator};
pub use notifier::{NoticeKind, Notifier, NullNotifier};
pub use profile_store::{NullProfileIdStore, ProfileIdStore};
pub use step_up::{DecliningStepUpPrompt, StepUpPrompt};

/// The full set of embedder-provided surfaces, registered at client
/// construction.
#[derive(Clone)]
pub struct Collaborators {
    #[allow(missing_docs)]
    pub notifier: Arc<dyn Notifier>,
    #[allow(missing_docs)]
    pub navigator: Arc<dyn Navigator>,
    #[allow(missing_docs)]
    pub step_up_prompt: Arc<dyn StepUpPrompt>,
    #[allow(missing_docs)]
    pub profile_ids: Arc<dyn ProfileIdStore>,
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            notifier: Arc::new(NullNotifier),
            navigator: Arc::new(NullNavigator),
            step_up_prompt: Arc::new(DecliningStepUpPrompt),
            profile_ids: Arc::new(NullProfileIdStore),
        }
    }
}
