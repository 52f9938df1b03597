//! Logger setup.
//!
//! The engine itself only uses the `log` macros; binaries call
//! [`init_logging`] once at startup.

mod init;

pub use init::{LoggingConfig, init_logging};
