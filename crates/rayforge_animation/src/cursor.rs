//! Cursor-accelerated timeline search.

const MAX_SCAN_OFFSET: usize = 3;

/// Remembers the last keyframe index a track was sampled at, so the next
/// sample (almost always at a nearby time) can be found with a short local
/// scan instead of a full binary search.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cursor {
    last_index: usize,
}

impl Cursor {
    /// Returns the index `i` such that `timeline[i] <= time < timeline[i + 1]`,
    /// clamped to `timeline.len() - 1` once `time` reaches the last keyframe.
    ///
    /// `timeline` must be non-empty and strictly increasing (an invariant
    /// `AnimationSampler::validate` already enforces upstream).
    pub fn locate(&mut self, timeline: &[f32], time: f32) -> usize {
        let len = timeline.len();
        if len == 1 {
            return 0;
        }

        let i = self.last_index.min(len - 1);
        let t_curr = timeline[i];

        let found = if time >= t_curr {
            let mut res = None;
            for offset in 0..=MAX_SCAN_OFFSET {
                let idx = i + offset;
                if idx >= len - 1 {
                    if time >= timeline[len - 1] {
                        res = Some(len - 1);
                    }
                    break;
                }
                if time < timeline[idx + 1] {
                    res = Some(idx);
                    break;
                }
            }
            res
        } else {
            let mut res = None;
            for offset in 0..=MAX_SCAN_OFFSET {
                if i < offset {
                    break;
                }
                let idx = i - offset;
                if time >= timeline[idx] {
                    res = Some(idx);
                    break;
                }
            }
            res
        };

        let idx = found.unwrap_or_else(|| {
            let next = timeline.partition_point(|&t| t <= time);
            next.saturating_sub(1)
        });
        self.last_index = idx;
        idx
    }
}
