use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, error::RecvError};

/// Something the media device reported.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlaybackEvent {
    MetadataLoaded {
        duration: f64,
    },
    TimeUpdate {
        current_time: f64,
        #[serde(default)]
        duration: Option<f64>,
    },
    Play,
    Pause,
    Ended,
}

/// `Some` only for durations the completion rule can divide by.
pub(crate) fn known_duration(duration: f64) -> Option<f64> {
    (duration.is_finite() && duration > 0.0).then_some(duration)
}

/// Device side of a playback stream. Cloning shares the same stream; the
/// stream closes once every clone is dropped.
#[derive(Debug, Clone)]
pub struct MediaDevice {
    tx: broadcast::Sender<PlaybackEvent>,
}

impl MediaDevice {
    pub fn new(buffer: usize) -> Self {
        let (tx, _) = broadcast::channel(buffer.max(1));
        Self { tx }
    }

    /// Returns how many observers saw the event.
    pub fn emit(&self, event: PlaybackEvent) -> usize {
        self.tx.send(event).unwrap_or(0)
    }

    /// Starts a new observation. Each call is independent; dropping the
    /// observer unsubscribes it.
    pub fn observe(&self) -> PlaybackObserver {
        PlaybackObserver {
            rx: self.tx.subscribe(),
            duration: None,
        }
    }
}

/// Pulls events from a [`MediaDevice`] as the device emits them.
#[derive(Debug)]
pub struct PlaybackObserver {
    rx: broadcast::Receiver<PlaybackEvent>,
    duration: Option<f64>,
}

impl PlaybackObserver {
    /// Waits for the next event. `None` once the device is gone.
    ///
    /// Time updates without a duration get the last known one filled in.
    pub async fn next_event(&mut self) -> Option<PlaybackEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(self.fill(event)),
                Err(RecvError::Lagged(skipped)) => {
                    // samples carry absolute time, dropping some is harmless
                    tracing::warn!(skipped, "playback observer lagged behind the device");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    fn fill(&mut self, event: PlaybackEvent) -> PlaybackEvent {
        match event {
            PlaybackEvent::MetadataLoaded { duration } => {
                if let Some(duration) = known_duration(duration) {
                    self.duration = Some(duration);
                }
                event
            }
            PlaybackEvent::TimeUpdate {
                current_time,
                duration,
            } => match duration.and_then(known_duration) {
                Some(duration) => {
                    self.duration = Some(duration);
                    event
                }
                None => PlaybackEvent::TimeUpdate {
                    current_time,
                    duration: self.duration,
                },
            },
            other => other,
        }
    }
}
