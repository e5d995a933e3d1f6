//! Overlay error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OverlayError {
    #[error("overlay is already initialized; call shutdown() first")]
    AlreadyInitialized,
    #[error("atlas pixel count {actual} does not match {width}x{height}")]
    AtlasSize { width: u32, height: u32, actual: usize },
}
