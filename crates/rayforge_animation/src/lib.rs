//! Keyframe sampling for `rayforge_scene::Animation`.
//!
//! A small forward/backward local scan around a cached cursor position
//! handles the common case of monotonically advancing playback in O(1)
//! amortized time, falling back to a binary search on a scrub or loop reset.

mod cursor;
mod sample;

pub use cursor::Cursor;
pub use sample::{evaluate, AnimatedTransform, AnimationState};
