//! The [`Client`] handle and its construction.

#[allow(clippy::module_inception)]
mod client;
mod client_settings;
mod internal;

pub use client::Client;
pub use client_settings::ClientSettings;
pub use internal::InternalClient;
