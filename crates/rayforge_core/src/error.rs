//! Error types for the render pipeline.
//!
//! A single `thiserror` enum with banner-commented sections, one variant per
//! distinct failure kind. Local failures (numerical scrubbing, per-primitive
//! loader skipping) are *not* represented here — they are handled in place
//! and never surfaced as a `RenderError`.

use thiserror::Error;

/// The error type returned by boundary operations: starting a render pass,
/// committing the intersector, or building geometry.
#[derive(Error, Debug)]
pub enum RenderError {
    // ========================================================================
    // Invalid input (rejected at the boundary)
    // ========================================================================
    /// A render parameter or camera value failed validation before any work
    /// started (negative sample count, non-finite camera vectors, a triangle
    /// index `>=` vertex count, etc).
    #[error("invalid render input: {0}")]
    InvalidInput(String),

    // ========================================================================
    // Intersector errors
    // ========================================================================
    /// The acceleration-structure library reported a build or commit failure.
    #[error("intersector commit failed: {0}")]
    IntersectorCommit(String),

    // ========================================================================
    // Resource exhaustion
    // ========================================================================
    /// Allocation failed while building geometry or image buffers.
    #[error("out of memory")]
    OutOfMemory,
}

/// The outcome of a render pass that did not fail outright.
///
/// Cancellation is explicitly not an error: the
/// driver reports how many samples it completed and leaves the accumulator
/// in a consistent partial state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStatus {
    /// The pass ran to completion with the requested number of samples.
    Completed {
        /// Samples accumulated per pixel.
        samples: u32,
    },
    /// The host raised the cancel flag before all samples were accumulated.
    Cancelled {
        /// Samples accumulated per pixel before cancellation.
        samples_so_far: u32,
    },
}

/// Alias for `Result<T, RenderError>`.
pub type Result<T> = std::result::Result<T, RenderError>;
