//! Interface a host scene drives each frame

use crate::error::Result;

/// Something advanced by the host's frame loop
pub trait Controller {
    /// Advance by `dt_ms` milliseconds of host time
    fn update(&mut self, dt_ms: f32) -> Result<()>;

    /// Whether `update` still does any work
    fn is_active(&self) -> bool;
}
