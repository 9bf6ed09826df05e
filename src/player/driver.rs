use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::{
    LessonSession, Notification, Notifier, PlaybackObserver, PlayerPolicy, ProgressPersister,
    ProgressStore, SessionEffect, SessionState,
};
use crate::web::AuthenticatedUser;

/// Everything a session needs from the outside.
#[derive(Clone)]
pub struct PlayerContext {
    pub user: AuthenticatedUser,
    pub store: Arc<dyn ProgressStore>,
    pub notifier: Notifier,
    pub policy: PlayerPolicy,
}

#[derive(Debug)]
pub struct SessionOutcome {
    pub state: SessionState,
    pub completed: bool,
    pub advanced_to: Option<Uuid>,
    pub cancelled: bool,
    /// Writes still running when the session stopped. Dropping these detaches
    /// them; they are never aborted.
    pub in_flight: Vec<JoinHandle<()>>,
}

/// Feeds device events into a [`LessonSession`] and carries out its effects.
pub struct SessionDriver {
    session: LessonSession,
    persister: ProgressPersister,
    notifier: Notifier,
    cancel: CancellationToken,
    in_flight: Vec<JoinHandle<()>>,
    advanced_to: Option<Uuid>,
}

impl SessionDriver {
    pub fn new(context: PlayerContext, session: LessonSession, cancel: CancellationToken) -> Self {
        let persister = ProgressPersister::new(
            context.store,
            context.user,
            context.notifier.clone(),
        );

        Self {
            session,
            persister,
            notifier: context.notifier,
            cancel,
            in_flight: Vec::new(),
            advanced_to: None,
        }
    }

    /// Runs until the device goes away or the session is cancelled. Events the
    /// device emitted before going away are still handled.
    #[tracing::instrument(name = "player_session", skip_all, fields(lesson_id = %self.session.lesson_id()))]
    pub async fn run(mut self, mut observer: PlaybackObserver) -> SessionOutcome {
        let cancelled = loop {
            let event = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break true,
                event = observer.next_event() => event,
            };

            let Some(event) = event else {
                break false;
            };

            tracing::trace!(?event, "playback event");
            for effect in self.session.handle(event) {
                self.apply(effect);
            }
            self.in_flight.retain(|handle| !handle.is_finished());
        };

        tracing::debug!(
            cancelled,
            state = ?self.session.state(),
            pending_writes = self.in_flight.len(),
            "player session stopped"
        );

        SessionOutcome {
            state: self.session.state(),
            completed: self.session.is_completed(),
            advanced_to: self.advanced_to,
            cancelled,
            in_flight: self.in_flight,
        }
    }

    fn apply(&mut self, effect: SessionEffect) {
        match effect {
            SessionEffect::Checkpoint {
                lesson_id,
                watch_time_seconds,
            } => {
                let handle = self.persister.checkpoint(lesson_id, watch_time_seconds);
                self.in_flight.push(handle);
            }
            SessionEffect::Complete { lesson_id } => {
                let handle = self.persister.mark_complete(lesson_id);
                self.in_flight.push(handle);
            }
            SessionEffect::Advance { next_lesson_id } => {
                tracing::info!(%next_lesson_id, "advancing to next lesson");
                self.advanced_to = Some(next_lesson_id);
                self.notifier.notify(Notification::Navigate {
                    lesson_id: next_lesson_id,
                });
            }
            SessionEffect::CourseFinished => {
                tracing::info!("end of course reached");
                self.notifier.notify(Notification::CourseFinished);
            }
        }
    }
}
