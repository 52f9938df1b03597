use std::time::{Duration, Instant};

/// Holds a render loop to a target frame rate.
///
/// Call [`FramePacer::frame_started`] at the top of a frame and
/// [`FramePacer::remaining`] after presenting; sleep for the returned duration.
#[derive(Debug, Clone)]
pub struct FramePacer {
    budget: Duration,
    started: Instant,
}

impl FramePacer {
    /// `fps == 0` disables pacing.
    pub fn new(fps: u32) -> Self {
        let budget = if fps == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(1.0 / fps as f64)
        };
        Self {
            budget,
            started: Instant::now(),
        }
    }

    #[inline]
    pub fn budget(&self) -> Duration {
        self.budget
    }

    pub fn frame_started(&mut self) {
        self.started = Instant::now();
    }

    /// Time spent in the current frame so far.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Sleep needed to fill the frame budget. Zero when the frame overran.
    pub fn remaining(&self) -> Duration {
        self.remaining_after(self.elapsed())
    }

    fn remaining_after(&self, elapsed: Duration) -> Duration {
        self.budget.saturating_sub(elapsed)
    }
}

impl Default for FramePacer {
    fn default() -> Self {
        Self::new(60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sixty_fps_budget() {
        let pacer = FramePacer::default();
        let ms = pacer.budget().as_secs_f64() * 1000.0;
        assert!((ms - 16.666).abs() < 0.01);
    }

    #[test]
    fn overrun_frames_do_not_sleep() {
        let pacer = FramePacer::new(60);
        assert_eq!(pacer.remaining_after(Duration::from_millis(40)), Duration::ZERO);
        assert_eq!(
            pacer.remaining_after(Duration::from_millis(6)),
            pacer.budget() - Duration::from_millis(6)
        );
    }

    #[test]
    fn zero_fps_disables_pacing() {
        assert_eq!(FramePacer::new(0).remaining(), Duration::ZERO);
    }
}
