//! sprite-fx library
//!
//! Command definitions and helpers behind the `sprite-fx` binary.

pub mod cli;
pub mod commands;
pub mod utils;
