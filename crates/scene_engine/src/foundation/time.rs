//! Time management utilities
//!
//! Simulation time is kept in `f64` so that the fixed-step accumulator does not
//! drift when many small frame deltas are summed.

/// Tolerance applied when comparing the accumulator against the step size
const ACCUMULATOR_EPSILON: f64 = 1.0e-9;

/// Default physics step: 50 Hz
pub const DEFAULT_FIXED_DELTA_TIME: f32 = 1.0 / 50.0;

/// Fixed-timestep accumulator
///
/// Frame deltas are accumulated and consumed in whole `fixed_delta_time`
/// increments, so the number of steps after any sequence of frames equals
/// `floor(total / fixed_delta_time)` regardless of how the total was sliced.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    fixed_delta_time: f64,
    accumulator: f64,
    elapsed: f64,
    step_count: u64,
}

impl Default for FixedTimestep {
    fn default() -> Self {
        Self::new(DEFAULT_FIXED_DELTA_TIME)
    }
}

impl FixedTimestep {
    /// Create an accumulator stepping in `fixed_delta_time` seconds
    pub fn new(fixed_delta_time: f32) -> Self {
        Self {
            fixed_delta_time: f64::from(fixed_delta_time.max(f32::EPSILON)),
            accumulator: 0.0,
            elapsed: 0.0,
            step_count: 0,
        }
    }

    /// Add a frame delta; negative and non-finite deltas are ignored
    pub fn accumulate(&mut self, delta_time: f32) {
        if delta_time.is_finite() && delta_time > 0.0 {
            let dt = f64::from(delta_time);
            self.accumulator += dt;
            self.elapsed += dt;
        }
    }

    /// Consume one fixed step if enough time has accumulated
    pub fn consume_step(&mut self) -> bool {
        if self.accumulator + ACCUMULATOR_EPSILON >= self.fixed_delta_time {
            self.accumulator = (self.accumulator - self.fixed_delta_time).max(0.0);
            self.step_count += 1;
            true
        } else {
            false
        }
    }

    /// Reset accumulated and elapsed time (the step size is kept)
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.elapsed = 0.0;
        self.step_count = 0;
    }

    /// Change the step size; accumulated time is preserved
    pub fn set_fixed_delta_time(&mut self, fixed_delta_time: f32) {
        self.fixed_delta_time = f64::from(fixed_delta_time.max(f32::EPSILON));
    }

    /// Step size in seconds
    #[allow(clippy::cast_possible_truncation)]
    pub fn fixed_delta_time(&self) -> f32 {
        self.fixed_delta_time as f32
    }

    /// Time waiting to be consumed by future steps
    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }

    /// Total simulated time fed in since the last reset
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Fixed steps consumed since the last reset
    pub fn step_count(&self) -> u64 {
        self.step_count
    }
}

/// Timing values handed to component hooks
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameTime {
    /// Delta for this dispatch (variable frame dt or the fixed step)
    pub delta_time: f32,
    /// Simulation time elapsed since play started
    pub elapsed: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_frames(timestep: &mut FixedTimestep, frames: &[f32]) -> Vec<u64> {
        frames
            .iter()
            .map(|&dt| {
                timestep.accumulate(dt);
                while timestep.consume_step() {}
                timestep.step_count()
            })
            .collect()
    }

    #[test]
    fn test_step_count_follows_cumulative_time() {
        let mut timestep = FixedTimestep::new(1.0 / 50.0);
        let counts = run_frames(&mut timestep, &[0.033, 0.017, 0.04]);
        assert_eq!(counts, vec![1, 2, 4]);
    }

    #[test]
    fn test_slicing_does_not_change_total() {
        let mut coarse = FixedTimestep::new(1.0 / 50.0);
        let mut fine = FixedTimestep::new(1.0 / 50.0);
        run_frames(&mut coarse, &[0.09]);
        run_frames(&mut fine, &[0.01; 9]);
        assert_eq!(coarse.step_count(), 4);
        assert_eq!(fine.step_count(), 4);
    }

    #[test]
    fn test_ignores_negative_delta() {
        let mut timestep = FixedTimestep::default();
        timestep.accumulate(-1.0);
        timestep.accumulate(f32::NAN);
        assert!(!timestep.consume_step());
        assert_eq!(timestep.elapsed(), 0.0);
    }
}
