use std::sync::{Arc, RwLock};

use auric_api::Configuration;

use crate::{
    collaborators::{Collaborators, Navigator, Notifier, ProfileIdStore, StepUpPrompt},
    session::SessionManager,
};

/// Shared state behind every [`Client`](super::Client) clone.
pub struct InternalClient {
    /// Use get_api_configuration() to access this.
    pub(crate) configuration: RwLock<Configuration>,
    pub(crate) sessions: SessionManager,
    pub(crate) collaborators: Collaborators,
}

impl std::fmt::Debug for InternalClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InternalClient")
            .field("sessions", &self.sessions)
            .finish_non_exhaustive()
    }
}

impl InternalClient {
    /// The wire-layer configuration currently in effect.
    pub fn get_api_configuration(&self) -> Configuration {
        self.configuration
            .read()
            .expect("RwLock should not be poisoned")
            .clone()
    }

    /// Replace the wire-layer configuration, e.g. to point a test client
    /// at a mock server.
    pub fn set_api_configuration(&self, configuration: Configuration) {
        *self
            .configuration
            .write()
            .expect("RwLock should not be poisoned") = configuration;
    }

    /// The session lifecycle manager.
    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// The embedder-provided notification surface.
    pub fn notifier(&self) -> Arc<dyn Notifier> {
        self.collaborators.notifier.clone()
    }

    /// The embedder-provided navigation surface.
    pub fn navigator(&self) -> Arc<dyn Navigator> {
        self.collaborators.navigator.clone()
    }

    /// The embedder-provided re-authentication surface.
    pub fn step_up_prompt(&self) -> Arc<dyn StepUpPrompt> {
        self.collaborators.step_up_prompt.clone()
    }

    /// The embedder-provided store for the previously selected profile id.
    pub fn profile_ids(&self) -> Arc<dyn ProfileIdStore> {
        self.collaborators.profile_ids.clone()
    }
}
