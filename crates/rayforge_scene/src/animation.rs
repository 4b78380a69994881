//! Keyframe animation data, sampled by `rayforge_animation`.
//!
//! A sampler owns a timeline plus flattened output values, a channel points
//! a sampler at one node's transform property, and a clip groups channels
//! under a name and an overall time range.

use crate::NodeKey;

/// How a sampler's values interpolate between keyframes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    Linear,
    Step,
    /// Valid only on `TargetPath::Rotation` samplers; values are unit
    /// quaternions interpolated with spherical linear interpolation.
    Slerp,
}

/// Which part of a node's local transform a channel drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetPath {
    Translation,
    Rotation,
    Scale,
}

/// A timeline plus flattened per-keyframe output values.
///
/// Invariants: `timeline` is strictly increasing and non-empty;
/// `values.len()` equals `timeline.len() * components`, where `components`
/// is 3 for `Translation`/`Scale` and 4 for `Rotation`.
#[derive(Debug, Clone)]
pub struct AnimationSampler {
    pub timeline: Vec<f32>,
    pub values: Vec<f32>,
    pub interpolation: Interpolation,
}

impl AnimationSampler {
    #[must_use]
    pub fn components(target: TargetPath) -> usize {
        match target {
            TargetPath::Translation | TargetPath::Scale => 3,
            TargetPath::Rotation => 4,
        }
    }

    /// Validates the timeline/values shape against the channel's target.
    pub fn validate(&self, target: TargetPath) -> Result<(), String> {
        if self.timeline.is_empty() {
            return Err("animation sampler timeline must not be empty".into());
        }
        if !self.timeline.windows(2).all(|w| w[0] < w[1]) {
            return Err("animation sampler timeline must be strictly increasing".into());
        }
        let expected = self.timeline.len() * Self::components(target);
        if self.values.len() != expected {
            return Err(format!(
                "animation sampler values length {} does not match timeline*components {expected}",
                self.values.len()
            ));
        }
        if self.interpolation == Interpolation::Slerp && target != TargetPath::Rotation {
            return Err("Slerp interpolation is only valid on a Rotation channel".into());
        }
        Ok(())
    }
}

/// Binds one sampler's output to one node's transform property.
#[derive(Debug, Clone)]
pub struct AnimationChannel {
    pub sampler: usize,
    pub target_node: NodeKey,
    pub target_path: TargetPath,
}

/// A named group of channels sharing samplers, with a cached overall time range.
#[derive(Debug, Clone)]
pub struct Animation {
    pub name: Option<String>,
    pub samplers: Vec<AnimationSampler>,
    pub channels: Vec<AnimationChannel>,
    pub timeline_min: f32,
    pub timeline_max: f32,
}

impl Animation {
    /// Recomputes `timeline_min`/`timeline_max` from the samplers actually
    /// referenced by a channel. Returns `(0.0, 0.0)` if there are none.
    #[must_use]
    pub fn compute_time_range(samplers: &[AnimationSampler], channels: &[AnimationChannel]) -> (f32, f32) {
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        for ch in channels {
            if let Some(s) = samplers.get(ch.sampler) {
                if let (Some(&first), Some(&last)) = (s.timeline.first(), s.timeline.last()) {
                    min = min.min(first);
                    max = max.max(last);
                }
            }
        }
        if !min.is_finite() || !max.is_finite() {
            (0.0, 0.0)
        } else {
            (min, max)
        }
    }

    /// Validates every channel's sampler index and sampler/target shape.
    pub fn validate(&self) -> Result<(), String> {
        for ch in &self.channels {
            let sampler = self
                .samplers
                .get(ch.sampler)
                .ok_or_else(|| format!("animation channel references out-of-range sampler {}", ch.sampler))?;
            sampler.validate(ch.target_path)?;
        }
        Ok(())
    }
}
