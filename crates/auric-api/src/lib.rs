#![doc = include_str!("../README.md")]

mod configuration;
mod error;

pub mod endpoints;
pub mod models;

pub use configuration::{Configuration, new_http_client};
pub use error::ApiError;
pub use reqwest::StatusCode;
