use std::time::Duration;
use std::time::Instant;

/// Snapshot handed to `DemoApp::update` each frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTime {
    /// Seconds since the previous frame.
    pub delta: f32,
    /// Seconds accumulated since the first frame.
    pub total: f32,
}

/// Measures frame deltas and a once-per-interval FPS figure.
#[derive(Debug)]
pub struct FrameTimer {
    last: Option<Instant>,
    total: f32,
    window_elapsed: f32,
    window_frames: u32,
    report_interval: f32,
    fps: Option<f32>,
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl FrameTimer {
    pub fn new(report_interval: Duration) -> Self {
        Self {
            last: None,
            total: 0.0,
            window_elapsed: 0.0,
            window_frames: 0,
            report_interval: report_interval.as_secs_f32(),
            fps: None,
        }
    }

    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let delta = self
            .last
            .map(|last| now.duration_since(last).as_secs_f32())
            .unwrap_or(0.0);
        self.last = Some(now);
        self.advance(delta)
    }

    /// Feeds an explicit delta. `tick` goes through here.
    pub fn advance(&mut self, delta: f32) -> FrameTime {
        self.total += delta;
        self.window_elapsed += delta;
        self.window_frames += 1;
        if self.window_elapsed >= self.report_interval {
            self.fps = Some(self.window_frames as f32 / self.window_elapsed);
            self.window_elapsed = 0.0;
            self.window_frames = 0;
        }
        FrameTime {
            delta,
            total: self.total,
        }
    }

    /// Returns the FPS computed at the end of the last full interval, once.
    pub fn take_fps(&mut self) -> Option<f32> {
        self.fps.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_total_time() {
        let mut timer = FrameTimer::default();
        timer.advance(0.25);
        let time = timer.advance(0.5);
        assert_eq!(time.delta, 0.5);
        assert_eq!(time.total, 0.75);
    }

    #[test]
    fn reports_fps_once_per_interval() {
        let mut timer = FrameTimer::new(Duration::from_secs(1));
        for _ in 0..59 {
            timer.advance(1.0 / 60.0);
        }
        assert_eq!(timer.take_fps(), None);
        timer.advance(1.0 / 60.0 + 0.001);
        let fps = timer.take_fps().expect("interval elapsed");
        assert!((fps - 60.0).abs() < 0.5, "fps was {fps}");
        assert_eq!(timer.take_fps(), None);
    }

    #[test]
    fn first_tick_has_zero_delta() {
        let mut timer = FrameTimer::default();
        assert_eq!(timer.tick().delta, 0.0);
    }
}
