#![doc = include_str!("../README.md")]

mod dispatcher;
mod error;
mod flow_handle;
mod operation;
mod orchestrators;
mod schema;

#[cfg(test)]
mod test_support;

use auric_core::Client;

pub use dispatcher::{
    BoxFuture, DEFAULT_LANDING_PATH, Dispatcher, RetryThunk, SIGN_IN_PATH, STEP_UP_PATH,
};
pub use error::FlowError;
pub use flow_handle::{FlowHandle, SubmitOutcome};
pub use operation::{Operation, OperationState};
pub use orchestrators::{
    LoginCredentials, LoginOrchestrator, RecoveryOrchestrator, RegistrationOrchestrator,
    SettingsOrchestrator, SignupDetails, VerificationOrchestrator,
};
pub use schema::{FieldSchema, FieldViolation, Schema};

/// Subclient for the self-service flow orchestrators.
///
/// Each accessor constructs a fresh orchestrator owning its own flow and
/// operation containers; orchestrators are kept alive by the embedder for
/// the lifetime of the screen they back.
pub struct FlowsClient {
    client: Client,
}

impl FlowsClient {
    fn new(client: Client) -> Self {
        Self { client }
    }

    /// Password, TOTP and social login.
    pub fn login(&self) -> LoginOrchestrator {
        LoginOrchestrator::new(self.client.clone())
    }

    /// The `aal2` login variant backing the step-up screen.
    pub fn step_up_login(&self) -> LoginOrchestrator {
        LoginOrchestrator::step_up(self.client.clone())
    }

    #[allow(missing_docs)]
    pub fn registration(&self) -> RegistrationOrchestrator {
        RegistrationOrchestrator::new(self.client.clone())
    }

    #[allow(missing_docs)]
    pub fn recovery(&self) -> RecoveryOrchestrator {
        RecoveryOrchestrator::new(self.client.clone())
    }

    #[allow(missing_docs)]
    pub fn verification(&self) -> VerificationOrchestrator {
        VerificationOrchestrator::new(self.client.clone())
    }

    #[allow(missing_docs)]
    pub fn settings(&self) -> SettingsOrchestrator {
        SettingsOrchestrator::new(self.client.clone())
    }
}

/// Extension which exposes the flow orchestrators on [`Client`].
pub trait FlowsClientExt {
    #[allow(missing_docs)]
    fn flows(&self) -> FlowsClient;
}

impl FlowsClientExt for Client {
    fn flows(&self) -> FlowsClient {
        FlowsClient::new(self.clone())
    }
}
