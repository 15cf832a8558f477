//! Shared infrastructure for Subledger binaries: logging bootstrap.

pub mod logging;
