//! Startup helpers shared by the service binaries.

pub mod bootstrap;
