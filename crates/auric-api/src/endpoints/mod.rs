//! One function per identity-provider endpoint.
//!
//! Every function builds the request from a [`Configuration`](crate::Configuration),
//! sends it, and branches on the status: success decodes the documented body,
//! anything else goes through the shared error decoder so provider errors
//! keep their structure.

mod flows;
mod logout;
mod schemas;
mod session;

pub use flows::{create_flow, get_flow, submit_flow};
pub use logout::{logout_flow, submit_logout};
pub use schemas::traits_schema;
pub use session::whoami;
