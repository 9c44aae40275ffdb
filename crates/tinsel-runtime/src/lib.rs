//! Tinsel Runtime - Frame loop infrastructure
//!
//! Provides the frame loop building blocks:
//! - `FrameClock` - per-frame delta tracking, wall-clock or manually stepped
//! - `ControlSignal` / `SignalBus` - queue of UI/gesture signals drained once per frame
//! - `RuntimeSystem` - trait for systems ticked by the frame loop

mod clock;
mod signal;
mod signal_bus;
mod system;

pub use clock::FrameClock;
pub use signal::ControlSignal;
pub use signal_bus::SignalBus;
pub use system::RuntimeSystem;
