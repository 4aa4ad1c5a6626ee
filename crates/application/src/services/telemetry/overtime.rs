use sinkhole_domain::OverTimeSlot;

/// Fixed-width, fixed-length histogram of query activity.
///
/// Slots are contiguous and ascending. The oldest slot starts at the interval
/// boundary at or below `now - retention`; the window reaches past the next
/// collector run so queries keep landing in their own slot in between.
#[derive(Debug, Clone)]
pub struct OverTime {
    slots: Vec<OverTimeSlot>,
    interval: i64,
}

impl OverTime {
    pub fn new(now: i64, retention_secs: i64, interval_secs: i64, slot_count: usize) -> Self {
        let interval = interval_secs.max(1);
        let oldest = align(now - retention_secs, interval);
        let slots = (0..slot_count.max(1))
            .map(|i| OverTimeSlot::empty(oldest + i as i64 * interval))
            .collect();
        Self { slots, interval }
    }

    pub fn interval(&self) -> i64 {
        self.interval
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[OverTimeSlot] {
        &self.slots
    }

    pub fn first_timestamp(&self) -> i64 {
        self.slots.first().map_or(0, |s| s.timestamp)
    }

    /// End (exclusive) of the newest slot.
    pub fn end_timestamp(&self) -> i64 {
        self.slots.last().map_or(0, |s| s.timestamp + self.interval)
    }

    /// Slot that should count a query arriving at `timestamp`.
    ///
    /// Timestamps older than the window have no slot. Timestamps past the
    /// newest slot are clamped into it.
    pub fn slot_for(&self, timestamp: i64) -> Option<usize> {
        let first = self.first_timestamp();
        if self.slots.is_empty() || timestamp < first {
            return None;
        }
        let index = ((timestamp - first) / self.interval) as usize;
        Some(index.min(self.slots.len() - 1))
    }

    /// Index of the slot starting exactly at `slot_start`, if still in the window.
    pub fn index_of(&self, slot_start: i64) -> Option<usize> {
        let offset = slot_start - self.first_timestamp();
        if offset < 0 || offset % self.interval != 0 {
            return None;
        }
        let index = (offset / self.interval) as usize;
        (index < self.slots.len()).then_some(index)
    }

    pub(crate) fn slot_mut(&mut self, index: usize) -> Option<&mut OverTimeSlot> {
        self.slots.get_mut(index)
    }

    /// Slides the window so its oldest slot covers `now - retention`.
    ///
    /// Returns how many slots dropped off the old end. Per-client arrays must
    /// be shifted by the same amount with [`shift_counts`].
    pub(crate) fn advance(&mut self, now: i64, retention_secs: i64) -> usize {
        let target = align(now - retention_secs, self.interval);
        let first = self.first_timestamp();
        if target <= first {
            return 0;
        }

        let len = self.slots.len();
        let shift = ((target - first) / self.interval) as usize;
        if shift >= len {
            for (i, slot) in self.slots.iter_mut().enumerate() {
                *slot = OverTimeSlot::empty(target + i as i64 * self.interval);
            }
            return len;
        }

        self.slots.rotate_left(shift);
        let newest_kept = self.slots[len - shift - 1].timestamp;
        for (k, slot) in self.slots[len - shift..].iter_mut().enumerate() {
            *slot = OverTimeSlot::empty(newest_kept + (k as i64 + 1) * self.interval);
        }
        shift
    }
}

/// Applies an [`OverTime::advance`] shift to a per-client count array.
pub(crate) fn shift_counts(counts: &mut [u64], shift: usize) {
    if shift == 0 {
        return;
    }
    if shift >= counts.len() {
        counts.fill(0);
        return;
    }
    counts.rotate_left(shift);
    let len = counts.len();
    counts[len - shift..].fill(0);
}

fn align(timestamp: i64, interval: i64) -> i64 {
    timestamp - timestamp.rem_euclid(interval)
}
