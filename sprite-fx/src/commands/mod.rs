//! Command implementations for sprite-fx

pub mod basis;
pub mod simulate;
