//! The inevitable catchall "utils" crate. Generally only add
//! things here that only depend on the standard library and
//! "core" crates.
//!
mod command;
pub use command::*;

/// The name of our binary
pub const NAME: &str = "sle2docker";
