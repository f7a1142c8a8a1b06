/// Maximum steps run for a single display frame (avoids a spiral of death after a stall).
const MAX_STEPS_PER_FRAME: u32 = 10;

/// Turns host frame timestamps into a whole number of fixed simulation steps.
///
/// The first frame after a (re)start always runs exactly one step, so a
/// freshly seeded field is integrated before it is first drawn.
#[derive(Debug, Clone)]
pub struct FrameClock {
    /// Fixed step length in seconds.
    step: f32,
    /// Unconsumed time in seconds.
    accumulator: f32,
    /// Timestamp of the previous frame in milliseconds.
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new(step_rate_hz: f32) -> Self {
        let step = if step_rate_hz.is_finite() && step_rate_hz > 0.0 {
            1.0 / step_rate_hz
        } else {
            1.0 / 60.0
        };
        Self {
            step,
            accumulator: 0.0,
            last_ms: None,
        }
    }

    /// Feed a host timestamp (milliseconds). Returns the number of steps to run.
    pub fn advance(&mut self, now_ms: f64) -> u32 {
        let Some(last) = self.last_ms.replace(now_ms) else {
            return 1;
        };
        let elapsed = ((now_ms - last) / 1000.0) as f32;
        if !elapsed.is_finite() || elapsed <= 0.0 {
            return 0;
        }
        self.accumulator += elapsed;
        let steps = (self.accumulator / self.step) as u32;
        if steps >= MAX_STEPS_PER_FRAME {
            // Drop the backlog instead of fast-forwarding through it.
            self.accumulator = 0.0;
            return MAX_STEPS_PER_FRAME;
        }
        self.accumulator -= steps as f32 * self.step;
        steps
    }

    /// Forget timing history; the next frame behaves like the first one.
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.last_ms = None;
    }

    /// Fixed step length in seconds.
    pub fn step(&self) -> f32 {
        self.step
    }
}
