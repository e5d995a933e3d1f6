//! Core types for the on-screen display overlay.
//!
//! This crate holds everything the overlay needs that does not touch the GPU:
//! - Monotonic clock and frame timing
//! - Performance statistics sources
//! - Packed ARGB colors
//! - The timed message registry
//! - The overlay enablement switch

pub mod color;
pub mod message;
pub mod stats;
pub mod switch;
pub mod time;

pub use color::*;
pub use message::*;
pub use stats::*;
pub use switch::*;
pub use time::*;
