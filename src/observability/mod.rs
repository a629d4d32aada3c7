//! Observability subsystem.
//!
//! Registration and lazy resolution emit `tracing` events throughout the
//! crate; this module only hosts the subscriber setup helper.

pub mod logging;
