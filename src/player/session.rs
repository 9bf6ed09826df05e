use uuid::Uuid;

use super::{
    CheckpointThrottle, CompletionEvaluator, LessonSequence, PlaybackEvent, PlayerPolicy,
    observer::known_duration,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Loading,
    Ready,
    Playing,
    Paused,
    Ended,
}

/// What a session asks its driver to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEffect {
    Checkpoint {
        lesson_id: Uuid,
        watch_time_seconds: u32,
    },
    Complete {
        lesson_id: Uuid,
    },
    Advance {
        next_lesson_id: Uuid,
    },
    CourseFinished,
}

/// One learner watching one lesson. Pure: events in, effects out.
#[derive(Debug, Clone)]
pub struct LessonSession {
    sequence: LessonSequence,
    position: usize,
    lesson_id: Uuid,
    state: SessionState,
    throttle: CheckpointThrottle,
    evaluator: CompletionEvaluator,
    duration: Option<f64>,
    completed: bool,
    ended_handled: bool,
}

fn whole_seconds(time: f64) -> Option<u32> {
    (time.is_finite() && time >= 0.0).then(|| time.floor().min(f64::from(u32::MAX)) as u32)
}

impl LessonSession {
    /// `None` when the lesson is not part of `sequence`.
    pub fn new(
        sequence: LessonSequence,
        lesson_id: Uuid,
        already_completed: bool,
        policy: PlayerPolicy,
    ) -> Option<Self> {
        let position = sequence.index_of(lesson_id)?;

        Some(Self {
            sequence,
            position,
            lesson_id,
            state: SessionState::Loading,
            throttle: CheckpointThrottle::new(policy.checkpoint_interval()),
            evaluator: CompletionEvaluator::new(policy.completion_threshold()),
            duration: None,
            completed: already_completed,
            ended_handled: false,
        })
    }

    pub fn lesson_id(&self) -> Uuid {
        self.lesson_id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn handle(&mut self, event: PlaybackEvent) -> Vec<SessionEffect> {
        let mut effects = Vec::new();

        match event {
            PlaybackEvent::MetadataLoaded { duration } => {
                if let Some(duration) = known_duration(duration) {
                    self.duration = Some(duration);
                }
                if self.state == SessionState::Loading {
                    self.state = SessionState::Ready;
                }
            }
            PlaybackEvent::Play => {
                self.state = SessionState::Playing;
            }
            PlaybackEvent::Pause => {
                if self.state == SessionState::Playing {
                    self.state = SessionState::Paused;
                }
            }
            PlaybackEvent::TimeUpdate {
                current_time,
                duration,
            } => {
                if matches!(self.state, SessionState::Loading | SessionState::Ready) {
                    self.state = SessionState::Playing;
                }
                if let Some(duration) = duration.and_then(known_duration) {
                    self.duration = Some(duration);
                }

                let checkpoint = whole_seconds(current_time).and_then(|s| self.throttle.offer(s));
                if let Some(watch_time_seconds) = checkpoint {
                    effects.push(SessionEffect::Checkpoint {
                        lesson_id: self.lesson_id,
                        watch_time_seconds,
                    });
                }

                let verdict = self
                    .evaluator
                    .evaluate(current_time, self.duration, self.completed);
                if verdict.triggers() {
                    self.completed = true;
                    effects.push(SessionEffect::Complete {
                        lesson_id: self.lesson_id,
                    });
                }
            }
            PlaybackEvent::Ended => {
                self.state = SessionState::Ended;
                if !self.ended_handled {
                    self.ended_handled = true;
                    effects.push(match self.sequence.next(self.position) {
                        Some(next) => SessionEffect::Advance {
                            next_lesson_id: next.id,
                        },
                        None => SessionEffect::CourseFinished,
                    });
                }
            }
        }

        effects
    }
}
