//! Errors shared across the SDK.

use thiserror::Error;

/// Missing required field.
#[derive(Debug, Error)]
#[error("The response received was missing a required field: {0}")]
pub struct MissingFieldError(pub &'static str);

/// Errors from the logout protocol. Local session state is cleared even
/// when one of these is returned.
#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum LogoutError {
    #[error(transparent)]
    Api(#[from] auric_api::ApiError),

    #[error("The logout flow carried neither a logout_token nor a logout_url token")]
    MissingToken,
}

/// This macro is used to require that a value is present or return an error
/// otherwise. It is equivalent to using `val.ok_or(Error::MissingFields)?`,
/// but easier to use and with a more descriptive error message.
/// Note that this macro will return early from the function if the value is
/// not present.
#[macro_export]
macro_rules! require {
    ($val:expr) => {
        match $val {
            Some(val) => val,
            None => return Err($crate::MissingFieldError(stringify!($val)).into()),
        }
    };
}
