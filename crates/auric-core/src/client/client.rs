use std::sync::{Arc, RwLock};

use auric_api::Configuration;

use super::{ClientSettings, internal::InternalClient};
use crate::{collaborators::Collaborators, session::SessionManager};

/// The main struct to interact with the Auric identity SDK.
///
/// One instance is constructed by the application root and injected into
/// every orchestrator; it starts Anonymous (no session) and is torn down by
/// clearing the session on full logout.
#[derive(Debug, Clone)]
pub struct Client {
    // Important: The [`Client`] struct requires its `Clone` implementation to return an owned
    // reference to the same instance, so orchestrators and collaborators all observe the same
    // session state. Any mutable state must live behind the Arc, inside [`InternalClient`].
    #[doc(hidden)]
    pub internal: Arc<InternalClient>,
}

impl Client {
    /// Create a new client with no-op collaborators. Useful for headless
    /// and test contexts; interactive embedders should use
    /// [`Client::with_collaborators`].
    pub fn new(settings: Option<ClientSettings>) -> Self {
        Self::with_collaborators(settings, Collaborators::default())
    }

    /// Create a new client wired to the embedding application's surfaces.
    pub fn with_collaborators(
        settings_input: Option<ClientSettings>,
        collaborators: Collaborators,
    ) -> Self {
        let settings = settings_input.unwrap_or_default();

        let configuration = Configuration {
            base_path: settings.public_url.clone(),
            user_agent: Some(settings.full_user_agent()),
            client: auric_api::new_http_client(),
        };

        let sessions = SessionManager::new(collaborators.profile_ids.clone());

        Self {
            internal: Arc::new(InternalClient {
                configuration: RwLock::new(configuration),
                sessions,
                collaborators,
            }),
        }
    }
}
