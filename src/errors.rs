//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! # Overview
//!
//! The main error type [`BloomError`] covers the failure modes of a bloom
//! pass:
//! - Scratch-buffer pool exhaustion
//! - Degenerate (zero-area) input buffers
//!
//! Out-of-range configuration is deliberately *not* an error: settings are
//! clamped by [`BloomSettings::sanitized`](crate::settings::BloomSettings::sanitized)
//! because the pipeline runs every frame and must never interrupt rendering.
//!
//! # Usage
//!
//! All public fallible APIs return [`Result<T>`], an alias for
//! `std::result::Result<T, BloomError>`.
//!
//! ```rust,ignore
//! use afterglow::errors::{BloomError, Result};
//!
//! fn run_pass() -> Result<()> {
//!     // Operations that may fail return Result
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type for the bloom pipeline.
///
/// Both variants are fatal for the *current frame's* bloom pass only;
/// the host degrades to a zero contribution rather than propagating.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BloomError {
    /// The scratch-buffer pool refused an allocation.
    ///
    /// Raised when a pool capacity limit is configured and the pipeline
    /// would exceed it mid-pass.
    #[error("buffer pool exhausted: {in_use} buffers in use, capacity {capacity}")]
    PoolExhausted {
        /// Buffers held when the acquisition failed.
        in_use: usize,
        /// Configured pool capacity.
        capacity: usize,
    },

    /// The source (or requested target) buffer has zero area.
    #[error("degenerate source buffer: {width}x{height}")]
    DegenerateSource {
        /// Source width in texels.
        width: u32,
        /// Source height in texels.
        height: u32,
    },
}

/// Alias for `Result<T, BloomError>`.
pub type Result<T> = std::result::Result<T, BloomError>;
