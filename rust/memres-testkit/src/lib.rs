//! Test utilities for the memres crates.
//!
//! - [`capture`]: in-memory writers for inspecting (or breaking) log output
//! - [`dirs`]: scratch directories for log files
//! - [`env`]: scoped, serialized modification of process environment variables
//! - [`resources`]: instrumented memory resources

pub mod capture;
pub mod dirs;
pub mod env;
pub mod resources;
