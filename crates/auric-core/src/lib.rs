#![doc = include_str!("../README.md")]

mod error;

pub mod client;
pub mod collaborators;
pub mod session;

mod session_client;

pub use client::{Client, ClientSettings};
pub use error::{LogoutError, MissingFieldError};
pub use session_client::SessionClient;
