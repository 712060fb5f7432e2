//! Core definitions relied upon by all memres-* crates.

pub mod error;
pub mod result;

pub use result::Result;
