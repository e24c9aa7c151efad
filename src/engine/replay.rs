//! Step replay
//!
//! Navigation over an already computed trace. Moving the cursor never
//! recomputes anything; it only selects which recorded step is current.

use super::Step;

/// Cursor over a recorded trace.
///
/// `position` counts the steps applied so far: 0 means nothing shown yet,
/// `len()` means the whole trace has been played.
#[derive(Debug, Clone)]
pub struct StepCursor<'a> {
    steps: &'a [Step],
    position: usize,
}

impl<'a> StepCursor<'a> {
    pub fn new(steps: &'a [Step]) -> Self {
        Self { steps, position: 0 }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// The step most recently applied
    pub fn current(&self) -> Option<&'a Step> {
        self.position.checked_sub(1).and_then(|i| self.steps.get(i))
    }

    pub fn is_finished(&self) -> bool {
        self.position >= self.steps.len()
    }

    pub fn remaining(&self) -> usize {
        self.steps.len() - self.position
    }

    /// Apply the next step. `None` once the trace is exhausted.
    pub fn step_forward(&mut self) -> Option<&'a Step> {
        if self.is_finished() {
            return None;
        }
        self.position += 1;
        self.current()
    }

    /// Go back one step. The first step is the earliest one reachable.
    pub fn step_back(&mut self) -> Option<&'a Step> {
        if self.position <= 1 {
            return None;
        }
        self.position -= 1;
        self.current()
    }

    /// Jump to `position`, clamped to the trace length
    pub fn seek(&mut self, position: usize) -> Option<&'a Step> {
        self.position = position.min(self.steps.len());
        self.current()
    }

    pub fn rewind(&mut self) {
        self.position = 0;
    }
}
