//! Runtime system trait

use tinsel_core::Result;

/// A system that can be ticked by the frame loop
///
/// The loop is single-threaded: control signals and configuration changes are
/// applied between frames, and `update` observes them at the start of the
/// next frame.
pub trait RuntimeSystem {
    /// Called once when the system is first registered
    fn initialize(&mut self) -> Result<()>;

    /// Called once per display frame
    fn update(&mut self, dt: f64) -> Result<()>;

    /// Called when the system is being shut down
    fn shutdown(&mut self) -> Result<()>;

    /// Human-readable name for this system
    fn name(&self) -> &str;
}
