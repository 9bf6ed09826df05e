use super::observer::known_duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionVerdict {
    /// Duration is unknown, zero or not a number.
    NotEvaluable,
    BelowThreshold,
    /// Fire the one-time completion write.
    Trigger,
    AlreadyCompleted,
}

impl CompletionVerdict {
    pub fn triggers(self) -> bool {
        matches!(self, Self::Trigger)
    }
}

/// Decides when a lesson counts as watched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionEvaluator {
    threshold: f64,
}

impl CompletionEvaluator {
    pub const DEFAULT_THRESHOLD: f64 = 0.9;

    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn evaluate(
        &self,
        current_time: f64,
        duration: Option<f64>,
        already_completed: bool,
    ) -> CompletionVerdict {
        if already_completed {
            return CompletionVerdict::AlreadyCompleted;
        }

        let Some(duration) = duration.and_then(known_duration) else {
            return CompletionVerdict::NotEvaluable;
        };

        if current_time / duration >= self.threshold {
            CompletionVerdict::Trigger
        } else {
            CompletionVerdict::BelowThreshold
        }
    }
}

impl Default for CompletionEvaluator {
    fn default() -> Self {
        Self::new(Self::DEFAULT_THRESHOLD)
    }
}
