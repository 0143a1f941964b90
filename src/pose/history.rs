//! Fixed-capacity pose history ring.

use crate::core::types::StampedPose;

/// Number of poses retained for time-indexed lookup.
pub const HISTORY_CAPACITY: usize = 1000;

/// Ring buffer of the last [`HISTORY_CAPACITY`] poses with an explicit
/// write cursor. Once full, the oldest entry is overwritten first.
#[derive(Debug, Clone)]
pub struct PoseHistory {
    entries: Vec<Option<StampedPose>>,
    next: usize,
}

impl Default for PoseHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl PoseHistory {
    /// Create an empty history.
    pub fn new() -> Self {
        Self {
            entries: vec![None; HISTORY_CAPACITY],
            next: 0,
        }
    }

    /// Append a pose, overwriting the oldest entry when full.
    pub fn push(&mut self, pose: StampedPose) {
        self.entries[self.next] = Some(pose);
        self.next = (self.next + 1) % HISTORY_CAPACITY;
    }

    /// Find the pose that was current at `stamp_us`.
    ///
    /// Scans from the oldest retained entry towards the newest and
    /// returns the earliest entry stamped at or after `stamp_us`,
    /// choosing whichever of it and its immediate predecessor is
    /// temporally closer (ties go to the later one). When every entry is
    /// older than `stamp_us` the newest entry examined is returned; an
    /// empty history yields `None`.
    pub fn lookup(&self, stamp_us: u64) -> Option<StampedPose> {
        let mut prev: Option<StampedPose> = None;
        for i in 0..HISTORY_CAPACITY {
            let slot = self.entries[(self.next + i) % HISTORY_CAPACITY];
            let pose = match slot {
                Some(p) => p,
                None => continue,
            };
            if pose.stamp_us >= stamp_us {
                return Some(match prev {
                    Some(pr) if stamp_us - pr.stamp_us < pose.stamp_us - stamp_us => pr,
                    _ => pose,
                });
            }
            prev = Some(pose);
        }
        prev
    }

    /// True when no pose has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(|e| e.is_none())
    }
}
