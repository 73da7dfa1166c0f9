//! Logging setup.
//!
//! Everything in the crate logs through the `log` facade; this module wires it
//! to `env_logger`.

mod init;

pub use init::{LoggingConfig, init_logging};
