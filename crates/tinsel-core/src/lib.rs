//! Tinsel Core - Foundational types for the Tinsel particle tree
//!
//! This crate provides the core types that all other Tinsel crates depend on:
//! - `ParticleId` - Index-stable particle identifiers
//! - `Vec3` - Spatial vector type
//! - `Color` - RGBA color with `#rrggbb` parsing
//! - Error types and Result alias

mod error;
mod id;
mod types;

pub use error::{Result, TinselError};
pub use id::ParticleId;
pub use types::{Color, Vec3};
