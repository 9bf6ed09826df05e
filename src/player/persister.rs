use std::sync::Arc;

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::Instrument;
use uuid::Uuid;

use super::{Notification, Notifier, ProgressStore};
use crate::error::log_error;
use crate::web::AuthenticatedUser;

/// Bounds checkpoint writes to one per `interval` seconds of playback.
///
/// Compares against the last persisted second rather than testing
/// `second % interval`, so irregular time updates never skip a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckpointThrottle {
    interval: u32,
    last_persisted: u32,
}

impl CheckpointThrottle {
    pub fn new(interval: u32) -> Self {
        Self {
            interval: interval.max(1),
            last_persisted: 0,
        }
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    pub fn last_persisted(&self) -> u32 {
        self.last_persisted
    }

    /// Returns the second to persist, if any. Seeking backwards moves the
    /// baseline without writing.
    pub fn offer(&mut self, second: u32) -> Option<u32> {
        if second < self.last_persisted {
            self.last_persisted = second;
            return None;
        }

        if second - self.last_persisted >= self.interval {
            self.last_persisted = second;
            Some(second)
        } else {
            None
        }
    }
}

/// Fire-and-forget progress writes for one learner.
#[derive(Clone)]
pub struct ProgressPersister {
    store: Arc<dyn ProgressStore>,
    user: AuthenticatedUser,
    notifier: Notifier,
}

impl ProgressPersister {
    pub fn new(store: Arc<dyn ProgressStore>, user: AuthenticatedUser, notifier: Notifier) -> Self {
        Self {
            store,
            user,
            notifier,
        }
    }

    pub fn checkpoint(&self, lesson_id: Uuid, watch_time_seconds: u32) -> JoinHandle<()> {
        let this = self.clone();
        let span = tracing::debug_span!("checkpoint", %lesson_id, watch_time_seconds);

        tokio::spawn(
            async move {
                match this
                    .store
                    .save_watch_time(&this.user, lesson_id, watch_time_seconds)
                    .await
                {
                    Ok(()) => tracing::debug!("watch time saved"),
                    Err(e) => {
                        log_error(&e);
                        this.notifier.notify(Notification::PersistFailed {
                            lesson_id,
                            message: String::from("Unable to save your progress."),
                        });
                    }
                }
            }
            .instrument(span),
        )
    }

    pub fn mark_complete(&self, lesson_id: Uuid) -> JoinHandle<()> {
        let this = self.clone();
        let span = tracing::debug_span!("mark_complete", %lesson_id);

        tokio::spawn(
            async move {
                match this
                    .store
                    .mark_complete(&this.user, lesson_id, Utc::now())
                    .await
                {
                    Ok(()) => {
                        tracing::info!("lesson completed");
                        this.notifier
                            .notify(Notification::LessonCompleted { lesson_id });
                    }
                    Err(e) => {
                        log_error(&e);
                        this.notifier.notify(Notification::PersistFailed {
                            lesson_id,
                            message: String::from("Unable to mark the lesson as completed."),
                        });
                    }
                }
            }
            .instrument(span),
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::player::MemoryProgressStore;

    #[test]
    fn throttles_to_interval() {
        let mut throttle = CheckpointThrottle::new(10);
        let written: Vec<u32> = (0..=25).filter_map(|s| throttle.offer(s)).collect();
        assert_eq!(written, vec![10, 20]);
    }

    #[test]
    fn irregular_updates_are_not_skipped() {
        let mut throttle = CheckpointThrottle::new(10);
        let written: Vec<u32> = [3, 9, 11, 19, 22, 35]
            .into_iter()
            .filter_map(|s| throttle.offer(s))
            .collect();
        assert_eq!(written, vec![11, 22, 35]);
    }

    #[test]
    fn seeking_back_rebases() {
        let mut throttle = CheckpointThrottle::new(10);
        assert_eq!(throttle.offer(40), Some(40));
        assert_eq!(throttle.offer(5), None);
        assert_eq!(throttle.last_persisted(), 5);
        assert_eq!(throttle.offer(14), None);
        assert_eq!(throttle.offer(15), Some(15));
    }

    #[test]
    fn zero_interval_is_clamped() {
        let mut throttle = CheckpointThrottle::new(0);
        assert_eq!(throttle.interval(), 1);
        assert_eq!(throttle.offer(0), None);
        assert_eq!(throttle.offer(1), Some(1));
    }

    #[tokio::test]
    async fn failure_is_reported() {
        let store = Arc::new(MemoryProgressStore::new());
        store.set_failing(true);
        let (notifier, mut rx) = Notifier::channel();
        let persister =
            ProgressPersister::new(store.clone(), AuthenticatedUser::admin(), notifier);
        let lesson_id = Uuid::new_v4();

        persister.checkpoint(lesson_id, 10).await.unwrap();
        assert_eq!(
            rx.recv().await,
            Some(Notification::PersistFailed {
                lesson_id,
                message: String::from("Unable to save your progress."),
            })
        );

        store.set_failing(false);
        persister.checkpoint(lesson_id, 20).await.unwrap();
        assert_eq!(store.checkpoints(), vec![20]);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn completion_is_announced() {
        let store = Arc::new(MemoryProgressStore::new());
        let (notifier, mut rx) = Notifier::channel();
        let user = AuthenticatedUser::admin();
        let persister = ProgressPersister::new(store.clone(), user.clone(), notifier);
        let lesson_id = Uuid::new_v4();

        persister.mark_complete(lesson_id).await.unwrap();
        assert_eq!(
            rx.recv().await,
            Some(Notification::LessonCompleted { lesson_id })
        );
        assert!(store.record(user.user_id(), lesson_id).unwrap().completed);
    }
}
