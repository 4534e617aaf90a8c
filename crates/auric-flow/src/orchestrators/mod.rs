//! One orchestrator per self-service use case.
//!
//! Each composes the flow handle, the schema merger and the error
//! dispatcher into a single user-facing operation sequence: validate
//! locally, fetch or reuse the flow, submit with the flow's CSRF token,
//! then update the session and navigate on success or dispatch on failure.
//! Within one orchestrator calls are strictly sequential; a submit is never
//! issued against a flow the orchestrator has not confirmed is current.

mod login;
mod recovery;
mod registration;
mod settings;
mod verification;

pub use login::{LoginCredentials, LoginOrchestrator};
pub use recovery::RecoveryOrchestrator;
pub use registration::{RegistrationOrchestrator, SignupDetails};
pub use settings::SettingsOrchestrator;
pub use verification::VerificationOrchestrator;

use auric_api::models::{Flow, UiMessageKind};

use crate::schema::FieldViolation;

/// Lower `validator` derive output into field violations.
pub(crate) fn violations_from(errors: &validator::ValidationErrors) -> Vec<FieldViolation> {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(|error| {
                FieldViolation::new(field, format!("failed the {} check", error.code))
            })
        })
        .collect()
}

/// Whether a re-rendered flow carries any error-level message.
pub(crate) fn has_error_messages(flow: &Flow) -> bool {
    flow.all_messages()
        .any(|message| message.kind == UiMessageKind::Error)
}
