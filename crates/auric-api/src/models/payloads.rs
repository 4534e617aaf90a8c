//! Method-specific submission bodies.
//!
//! Every payload carries the flow's CSRF token and the `method`
//! discriminator the provider uses to pick a strategy.

use serde::Serialize;

use super::IdentityTraits;

/// `method: password` login submission.
#[derive(Debug, Clone, Serialize)]
pub struct PasswordLoginPayload {
    #[allow(missing_docs)]
    pub csrf_token: String,
    method: &'static str,
    /// The identifier the user signs in with; an email address here.
    pub identifier: String,
    #[allow(missing_docs)]
    pub password: String,
}

impl PasswordLoginPayload {
    #[allow(missing_docs)]
    pub fn new(csrf_token: String, identifier: String, password: String) -> Self {
        Self {
            csrf_token,
            method: "password",
            identifier,
            password,
        }
    }
}

/// `method: totp` login submission, used by the step-up (`aal2`) flow.
#[derive(Debug, Clone, Serialize)]
pub struct TotpLoginPayload {
    #[allow(missing_docs)]
    pub csrf_token: String,
    method: &'static str,
    #[allow(missing_docs)]
    pub totp_code: String,
}

impl TotpLoginPayload {
    #[allow(missing_docs)]
    pub fn new(csrf_token: String, totp_code: String) -> Self {
        Self {
            csrf_token,
            method: "totp",
            totp_code,
        }
    }
}

/// `method: oidc` login/registration submission naming the social provider.
#[derive(Debug, Clone, Serialize)]
pub struct OidcLoginPayload {
    #[allow(missing_docs)]
    pub csrf_token: String,
    method: &'static str,
    /// Provider key as configured upstream, e.g. `google`.
    pub provider: String,
}

impl OidcLoginPayload {
    #[allow(missing_docs)]
    pub fn new(csrf_token: String, provider: String) -> Self {
        Self {
            csrf_token,
            method: "oidc",
            provider,
        }
    }
}

/// `method: password` signup submission.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationPayload {
    #[allow(missing_docs)]
    pub csrf_token: String,
    method: &'static str,
    #[allow(missing_docs)]
    pub password: String,
    #[allow(missing_docs)]
    pub traits: IdentityTraits,
}

impl RegistrationPayload {
    #[allow(missing_docs)]
    pub fn new(csrf_token: String, password: String, traits: IdentityTraits) -> Self {
        Self {
            csrf_token,
            method: "password",
            password,
            traits,
        }
    }
}

/// `method: code` recovery submission: the email step sends the challenge,
/// the code step answers it. Exactly one of the two fields is set.
#[derive(Debug, Clone, Serialize)]
pub struct RecoveryPayload {
    #[allow(missing_docs)]
    pub csrf_token: String,
    method: &'static str,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl RecoveryPayload {
    /// Request a recovery code be sent to `email`.
    pub fn request(csrf_token: String, email: String) -> Self {
        Self {
            csrf_token,
            method: "code",
            email: Some(email),
            code: None,
        }
    }

    /// Answer the challenge with the received code.
    pub fn confirm(csrf_token: String, code: String) -> Self {
        Self {
            csrf_token,
            method: "code",
            email: None,
            code: Some(code),
        }
    }
}

/// `method: code` verification submission, same two-step shape as recovery.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationPayload {
    #[allow(missing_docs)]
    pub csrf_token: String,
    method: &'static str,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl VerificationPayload {
    /// Request a verification code be sent to `email`.
    pub fn request(csrf_token: String, email: String) -> Self {
        Self {
            csrf_token,
            method: "code",
            email: Some(email),
            code: None,
        }
    }

    /// Answer the challenge with the received code.
    pub fn confirm(csrf_token: String, code: String) -> Self {
        Self {
            csrf_token,
            method: "code",
            email: None,
            code: Some(code),
        }
    }
}

/// `method: password` settings submission (password change).
#[derive(Debug, Clone, Serialize)]
pub struct SettingsPasswordPayload {
    #[allow(missing_docs)]
    pub csrf_token: String,
    method: &'static str,
    #[allow(missing_docs)]
    pub password: String,
}

impl SettingsPasswordPayload {
    #[allow(missing_docs)]
    pub fn new(csrf_token: String, password: String) -> Self {
        Self {
            csrf_token,
            method: "password",
            password,
        }
    }
}

/// `method: profile` settings submission (trait edits).
#[derive(Debug, Clone, Serialize)]
pub struct SettingsTraitsPayload {
    #[allow(missing_docs)]
    pub csrf_token: String,
    method: &'static str,
    #[allow(missing_docs)]
    pub traits: IdentityTraits,
}

impl SettingsTraitsPayload {
    #[allow(missing_docs)]
    pub fn new(csrf_token: String, traits: IdentityTraits) -> Self {
        Self {
            csrf_token,
            method: "profile",
            traits,
        }
    }
}

/// `method: totp` settings submission: enroll an authenticator or unlink
/// the existing one.
#[derive(Debug, Clone, Serialize)]
pub struct SettingsTotpPayload {
    #[allow(missing_docs)]
    pub csrf_token: String,
    method: &'static str,
    /// Code proving possession of the new authenticator.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub totp_code: Option<String>,
    /// Set to unlink the enrolled authenticator.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub totp_unlink: Option<bool>,
}

impl SettingsTotpPayload {
    /// Enroll: confirm the scanned secret with a generated code.
    pub fn enroll(csrf_token: String, totp_code: String) -> Self {
        Self {
            csrf_token,
            method: "totp",
            totp_code: Some(totp_code),
            totp_unlink: None,
        }
    }

    /// Unlink the currently enrolled authenticator.
    pub fn unlink(csrf_token: String) -> Self {
        Self {
            csrf_token,
            method: "totp",
            totp_code: None,
            totp_unlink: Some(true),
        }
    }
}
