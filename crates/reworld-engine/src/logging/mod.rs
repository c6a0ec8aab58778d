//! Logger setup.
//!
//! The engine only logs through the `log` facade; `init_logging` installs an
//! `env_logger` backend for binaries that want one.

mod init;

pub use init::{init_logging, LoggingConfig};
