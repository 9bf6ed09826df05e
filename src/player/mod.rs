//! Lesson progress tracking for the course player.
//!
//! The pieces, leaves first: a [`PlaybackObserver`] turns device events into
//! samples, a [`LessonSession`] applies the checkpoint throttle, the
//! completion rule and auto-advance to them, and a [`SessionDriver`] carries
//! out the resulting effects against a [`ProgressStore`].
//! [`percent_complete`] and [`flatten`] work on a course outline and are used
//! by the learner views as well.

mod aggregate;
pub use aggregate::{CompletionMap, CourseProgress, percent_complete};

mod completion;
pub use completion::{CompletionEvaluator, CompletionVerdict};

mod driver;
pub use driver::{PlayerContext, SessionDriver, SessionOutcome};

mod navigator;
pub use navigator::{LessonSequence, Navigation, flatten};

mod notify;
pub use notify::{Notification, Notifier};

mod observer;
pub use observer::{MediaDevice, PlaybackEvent, PlaybackObserver};

mod outline;
pub use outline::{OutlineLesson, OutlineModule};

mod persister;
pub use persister::{CheckpointThrottle, ProgressPersister};

mod session;
pub use session::{LessonSession, SessionEffect, SessionState};

mod store;
pub use store::ProgressStore;

#[cfg(test)]
pub(crate) use store::memory::MemoryProgressStore;

/// Knobs shared by every player session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerPolicy {
    checkpoint_interval: u32,
    completion_threshold: f64,
}

impl PlayerPolicy {
    /// `checkpoint_interval` is clamped to at least one second. A threshold
    /// outside `(0, 1]` falls back to the default.
    pub fn new(checkpoint_interval: u32, completion_threshold: f64) -> Self {
        let completion_threshold = if completion_threshold > 0.0 && completion_threshold <= 1.0 {
            completion_threshold
        } else {
            CompletionEvaluator::DEFAULT_THRESHOLD
        };

        Self {
            checkpoint_interval: checkpoint_interval.max(1),
            completion_threshold,
        }
    }

    pub fn checkpoint_interval(&self) -> u32 {
        self.checkpoint_interval
    }

    pub fn completion_threshold(&self) -> f64 {
        self.completion_threshold
    }
}

impl Default for PlayerPolicy {
    fn default() -> Self {
        Self::new(10, CompletionEvaluator::DEFAULT_THRESHOLD)
    }
}
