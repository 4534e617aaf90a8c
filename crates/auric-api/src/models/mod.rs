//! Wire models for the identity provider's self-service API.

mod flow;
mod logout;
mod payloads;
mod provider_error;
mod schema;
mod session;

pub use flow::{AuthLevel, CreateFlowParams, Flow, FlowKind, FlowUi, UiMessage, UiMessageKind, UiNode};
pub use logout::LogoutFlow;
pub use payloads::{
    OidcLoginPayload, PasswordLoginPayload, RecoveryPayload, RegistrationPayload,
    SettingsPasswordPayload, SettingsTotpPayload, SettingsTraitsPayload, TotpLoginPayload,
    VerificationPayload,
};
pub use provider_error::{ErrorId, ProviderError, ProviderErrorEnvelope};
pub use schema::RemoteSchema;
pub use session::{Identity, IdentityTraits, PersonName, Session, SessionDevice, SessionResponse, SubmitResult};
