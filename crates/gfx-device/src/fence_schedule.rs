/// Per swapchain image fence values.
///
/// Each image remembers the value that will be signalled once the GPU is done
/// with the commands recorded through that image's command allocator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FenceSchedule<const N: usize> {
    values: [u64; N],
}

/// What `present` has to do with the native fence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresentStep {
    /// Signalled on the queue right after the present.
    pub signal: u64,
    /// The CPU waits until the fence reaches this before reusing the next image.
    pub wait_for: u64,
}

impl<const N: usize> Default for FenceSchedule<N> {
    fn default() -> Self {
        Self { values: [0; N] }
    }
}

impl<const N: usize> FenceSchedule<N> {
    /// Schedule for a native fence created with value 0.
    ///
    /// Every image starts at 0 except `frame_index`, which starts at 1 so that
    /// a flush issued before the first present waits for real work.
    pub fn starting_at(frame_index: usize) -> Self {
        let mut schedule = Self::default();
        schedule.values[frame_index] = 1;
        schedule
    }

    #[cfg(test)]
    fn value(&self, frame_index: usize) -> u64 {
        self.values[frame_index]
    }

    /// Moves from `current` to `next` after a present.
    ///
    /// The returned `wait_for` is read before `next` is updated, so it is the
    /// value signalled the last time `next` was used.
    pub fn advance(&mut self, current: usize, next: usize) -> PresentStep {
        let signal = self.values[current];
        let wait_for = self.values[next];
        self.values[next] = signal + 1;
        PresentStep { signal, wait_for }
    }

    /// Full flush of the queue: returns the value to signal and wait for, and
    /// bumps the stored value for `current`.
    pub fn flush(&mut self, current: usize) -> u64 {
        let value = self.values[current];
        self.values[current] = value + 1;
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frames_do_not_wait() {
        let mut schedule = FenceSchedule::<3>::default();
        let step = schedule.advance(0, 1);
        assert_eq!(step, PresentStep { signal: 0, wait_for: 0 });
        let step = schedule.advance(1, 2);
        assert_eq!(step, PresentStep { signal: 1, wait_for: 0 });
        assert_eq!(schedule.value(2), 2);
    }

    #[test]
    fn reused_image_waits_for_its_previous_work() {
        let mut schedule = FenceSchedule::<2>::default();
        // frame 0 -> 1 -> 0 -> 1
        schedule.advance(0, 1);
        let step = schedule.advance(1, 0);
        assert_eq!(step, PresentStep { signal: 1, wait_for: 0 });
        let step = schedule.advance(0, 1);
        // image 1 was last submitted with value 1
        assert_eq!(step, PresentStep { signal: 2, wait_for: 1 });
    }

    #[test]
    fn stored_values_only_grow() {
        let mut schedule = FenceSchedule::<3>::default();
        let mut current = 0;
        let mut last_signal = 0;
        for frame in 0..20 {
            let next = (current + 1) % 3;
            let step = schedule.advance(current, next);
            if frame > 0 {
                assert!(step.signal > last_signal);
            }
            assert!(step.wait_for <= step.signal);
            last_signal = step.signal;
            current = next;
        }
        assert_eq!(schedule.value(current), last_signal + 1);
    }

    #[test]
    fn flush_before_first_present_waits_for_work() {
        let mut schedule = FenceSchedule::<3>::starting_at(2);
        assert_eq!(schedule.flush(2), 1);
        let step = schedule.advance(2, 0);
        assert_eq!(step, PresentStep { signal: 2, wait_for: 0 });
        assert_eq!(schedule.value(0), 3);
    }

    #[test]
    fn flush_bumps_current_value() {
        let mut schedule = FenceSchedule::<2>::default();
        schedule.advance(0, 1);
        assert_eq!(schedule.flush(1), 1);
        assert_eq!(schedule.value(1), 2);
        let step = schedule.advance(1, 0);
        assert_eq!(step.signal, 2);
    }
}
