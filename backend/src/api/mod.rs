//! HTTP API module.
//!
//! Server, response types and log streaming for the dashboard frontend.

pub mod logs;
pub mod server;
pub mod types;

pub use logs::*;
pub use server::{router, start_server};
pub use types::*;
