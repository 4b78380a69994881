//! Per-node TRS overrides produced by evaluating an [`Animation`] at a time.

use glam::{Quat, Vec3};
use slotmap::SecondaryMap;

use rayforge_scene::{Animation, AnimationSampler, Interpolation, NodeKey, TargetPath};

use crate::Cursor;

/// A partial transform override: only the components actually driven by a
/// channel targeting this node are `Some`. A node with no animated
/// component at all simply has no entry, and the geometry update step
/// must fall back to the node's own `local_matrix` rather than
/// treating a missing entry as all-identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnimatedTransform {
    pub translation: Option<Vec3>,
    pub rotation: Option<Quat>,
    pub scale: Option<Vec3>,
}

/// Holds one [`Cursor`] per sampler in an animation plus the per-node
/// overrides computed by the most recent [`evaluate`] call. Reused across
/// frames so the cursor scan stays O(1) for ordinary forward playback.
#[derive(Debug, Clone, Default)]
pub struct AnimationState {
    cursors: Vec<Cursor>,
    overrides: SecondaryMap<NodeKey, AnimatedTransform>,
}

impl AnimationState {
    #[must_use]
    pub fn new(animation: &Animation) -> Self {
        Self { cursors: vec![Cursor::default(); animation.samplers.len()], overrides: SecondaryMap::new() }
    }

    /// The nodes touched by the most recent [`evaluate`] call, with their
    /// overrides. Nodes absent from this map are not animated this frame.
    #[must_use]
    pub fn overrides(&self) -> &SecondaryMap<NodeKey, AnimatedTransform> {
        &self.overrides
    }
}

fn decode_vec3(values: &[f32], index: usize) -> Vec3 {
    let base = index * 3;
    Vec3::new(values[base], values[base + 1], values[base + 2])
}

fn decode_quat(values: &[f32], index: usize) -> Quat {
    let base = index * 4;
    Quat::from_xyzw(values[base], values[base + 1], values[base + 2], values[base + 3])
}

fn sample_vec3(sampler: &AnimationSampler, time: f32, cursor: &mut Cursor) -> Vec3 {
    let len = sampler.timeline.len();
    let idx = cursor.locate(&sampler.timeline, time);
    if sampler.interpolation == Interpolation::Step || idx + 1 >= len {
        return decode_vec3(&sampler.values, idx);
    }
    let t0 = sampler.timeline[idx];
    let t1 = sampler.timeline[idx + 1];
    let dt = t1 - t0;
    let t = if dt > 1e-6 { ((time - t0) / dt).clamp(0.0, 1.0) } else { 0.0 };
    decode_vec3(&sampler.values, idx).lerp(decode_vec3(&sampler.values, idx + 1), t)
}

fn sample_quat(sampler: &AnimationSampler, time: f32, cursor: &mut Cursor) -> Quat {
    let len = sampler.timeline.len();
    let idx = cursor.locate(&sampler.timeline, time);
    if sampler.interpolation == Interpolation::Step || idx + 1 >= len {
        return decode_quat(&sampler.values, idx);
    }
    let t0 = sampler.timeline[idx];
    let t1 = sampler.timeline[idx + 1];
    let dt = t1 - t0;
    let t = if dt > 1e-6 { ((time - t0) / dt).clamp(0.0, 1.0) } else { 0.0 };
    decode_quat(&sampler.values, idx).slerp(decode_quat(&sampler.values, idx + 1), t)
}

/// Samples every channel of `animation` at `time` and refreshes `state`'s
/// per-node overrides. `time` is expected to already be clamped into
/// `[animation.timeline_min, animation.timeline_max]` by the caller.
pub fn evaluate(animation: &Animation, time: f32, state: &mut AnimationState) {
    state.overrides.clear();
    if state.cursors.len() != animation.samplers.len() {
        state.cursors = vec![Cursor::default(); animation.samplers.len()];
    }

    for channel in &animation.channels {
        let Some(sampler) = animation.samplers.get(channel.sampler) else { continue };
        let cursor = &mut state.cursors[channel.sampler];
        let entry = state.overrides.entry(channel.target_node).unwrap().or_default();
        match channel.target_path {
            TargetPath::Translation => entry.translation = Some(sample_vec3(sampler, time, cursor)),
            TargetPath::Scale => entry.scale = Some(sample_vec3(sampler, time, cursor)),
            TargetPath::Rotation => entry.rotation = Some(sample_quat(sampler, time, cursor)),
        }
    }
}
