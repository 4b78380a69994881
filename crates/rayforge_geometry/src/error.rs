//! Errors from flattening a `Model` into intersector geometry.

use thiserror::Error;

/// Failures `generate_geometries`/`update_geometries` can return. Both
/// invalid-input variants are the caller's to surface as a boundary
/// rejection; `Intersector` passes through a lower-level commit failure.
#[derive(Error, Debug)]
pub enum GeometryBuildError {
    #[error("invalid primitive: {0}")]
    InvalidPrimitive(String),
    #[error("invalid animation: {0}")]
    InvalidAnimation(String),
    #[error(transparent)]
    Intersector(#[from] rayforge_intersect::IntersectorError),
}
