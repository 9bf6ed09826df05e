use serde::Serialize;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Non-blocking messages for the learner. None of them interrupt playback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    LessonCompleted { lesson_id: Uuid },
    PersistFailed { lesson_id: Uuid, message: String },
    Navigate { lesson_id: Uuid },
    CourseFinished,
}

#[derive(Debug, Clone)]
pub struct Notifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl Notifier {
    pub fn new(tx: mpsc::UnboundedSender<Notification>) -> Self {
        Self { tx }
    }

    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    pub fn notify(&self, notification: Notification) {
        if let Err(e) = self.tx.send(notification) {
            tracing::trace!(notification = ?e.0, "learner is gone, notification dropped");
        }
    }
}
