// ABOUTME: SSH client module for the remote deploy host.
// ABOUTME: Supports key, agent, and password authentication with known_hosts verification.

mod client;
mod error;

pub use client::{CommandOutput, Session, SessionConfig};
pub use error::{Error, Result};
