//! Command implementations for memres-cmd

pub mod summarize;
pub mod trace;
