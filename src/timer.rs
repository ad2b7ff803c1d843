use crate::config::TickMode;
use crate::consts::{MAX_TICKS_PER_FRAME, STEP};

/// Converts animation-frame timestamps into simulation ticks and keeps a
/// running FPS estimate.
#[derive(Debug, Default)]
pub struct FrameTimer {
    last_time: Option<f64>,
    accumulator: f32,
    fps_accum: f32,
    fps_frames: u32,
    fps: f32,
}

impl FrameTimer {
    /// Record a frame at `now_ms` and return the elapsed seconds. The first
    /// frame after construction or `restart_clock` reports zero.
    pub fn advance(&mut self, now_ms: f64) -> f32 {
        let dt = match self.last_time {
            Some(last) => ((now_ms - last) / 1000.0) as f32,
            None => 0.0,
        };
        self.last_time = Some(now_ms);
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.accumulate(dt);
        dt
    }

    fn accumulate(&mut self, dt: f32) {
        self.accumulator += dt;
        self.fps_accum += dt;
        self.fps_frames += 1;
        // Half a step of slack so rounding never costs a capped frame a tick.
        let max_accum = STEP * (MAX_TICKS_PER_FRAME as f32 + 0.5);
        if self.accumulator > max_accum {
            self.accumulator = max_accum;
        }
        if self.fps_accum >= 0.5 {
            self.fps = self.fps_frames as f32 / self.fps_accum.max(1e-5);
            self.fps_accum = 0.0;
            self.fps_frames = 0;
        }
    }

    /// Number of ticks to run for the frame just recorded.
    pub fn take_steps(&mut self, mode: TickMode) -> u32 {
        match mode {
            TickMode::PerFrame => {
                self.accumulator = 0.0;
                1
            }
            TickMode::Fixed => {
                let mut steps = 0;
                while self.accumulator >= STEP && steps < MAX_TICKS_PER_FRAME {
                    self.accumulator -= STEP;
                    steps += 1;
                }
                steps
            }
        }
    }

    /// Forget the previous timestamp, e.g. after the loop sat idle.
    pub fn restart_clock(&mut self) {
        self.last_time = None;
        self.accumulator = 0.0;
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME_MS: f64 = 1000.0 / 60.0;

    #[test]
    fn test_first_frame_runs_no_fixed_ticks() {
        let mut timer = FrameTimer::default();
        assert_eq!(timer.advance(1234.0), 0.0);
        assert_eq!(timer.take_steps(TickMode::Fixed), 0);
    }

    #[test]
    fn test_fixed_ticks_follow_wall_clock() {
        let mut timer = FrameTimer::default();
        timer.advance(0.0);

        // 120 Hz display: a tick every other frame.
        let mut ticks = 0;
        for frame in 1..=120 {
            timer.advance(frame as f64 * FRAME_MS / 2.0);
            ticks += timer.take_steps(TickMode::Fixed);
        }
        assert!((59..=60).contains(&ticks), "ticks = {ticks}");
    }

    #[test]
    fn test_long_stall_is_capped() {
        let mut timer = FrameTimer::default();
        timer.advance(0.0);
        timer.advance(5_000.0);
        assert_eq!(timer.take_steps(TickMode::Fixed), MAX_TICKS_PER_FRAME);
        assert_eq!(timer.take_steps(TickMode::Fixed), 0);
    }

    #[test]
    fn test_per_frame_mode_ticks_once() {
        let mut timer = FrameTimer::default();
        timer.advance(0.0);
        timer.advance(100.0);
        assert_eq!(timer.take_steps(TickMode::PerFrame), 1);
    }

    #[test]
    fn test_restart_clock_discards_idle_time() {
        let mut timer = FrameTimer::default();
        timer.advance(0.0);
        timer.restart_clock();
        assert_eq!(timer.advance(60_000.0), 0.0);
        assert_eq!(timer.take_steps(TickMode::Fixed), 0);
    }

    #[test]
    fn test_fps_estimate() {
        let mut timer = FrameTimer::default();
        timer.advance(0.0);
        for frame in 1..=70 {
            timer.advance(frame as f64 * FRAME_MS);
        }
        assert!((timer.fps() - 60.0).abs() < 1.0, "fps = {}", timer.fps());
    }
}
