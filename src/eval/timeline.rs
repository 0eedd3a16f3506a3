use crate::foundation::math::clamp_unit;

/// Where a progress ratio lands on a mechanism's step timeline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepCursor {
    pub step_index: u32,
    pub step_count: u32,
    /// Fraction through the active step, in `[0, 1]`.
    pub step_progress: f64,
}

impl StepCursor {
    /// 1-based `"Step i/N"` text.
    pub fn badge(&self) -> String {
        format!("Step {}/{}", self.step_index + 1, self.step_count)
    }

    pub fn is_last(&self) -> bool {
        self.step_index + 1 >= self.step_count
    }
}

/// `floor(clamp(progress) × count)`, clamped to the last step. `step_count` of 0 is treated as 1.
pub fn active_step_index(step_count: u32, progress: f64) -> u32 {
    let count = step_count.max(1);
    let scaled = clamp_unit(progress) * f64::from(count);
    (scaled.floor() as u32).min(count - 1)
}

pub fn step_cursor(step_count: u32, progress: f64) -> StepCursor {
    let count = step_count.max(1);
    let step_index = active_step_index(count, progress);
    let scaled = clamp_unit(progress) * f64::from(count);
    StepCursor {
        step_index,
        step_count: count,
        step_progress: clamp_unit(scaled - f64::from(step_index)),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/eval/timeline.rs"]
mod tests;
