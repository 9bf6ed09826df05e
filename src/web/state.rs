use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::model::ModelManager;
use crate::player::{PlayerPolicy, ProgressStore};

#[derive(Debug, Clone)]
pub struct AppState {
    mm: ModelManager,
    policy: PlayerPolicy,
    device_buffer: usize,
    shutdown: CancellationToken,
}

impl AppState {
    pub fn new(mm: ModelManager, policy: PlayerPolicy, device_buffer: usize) -> Self {
        Self {
            mm,
            policy,
            device_buffer,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn pool(&self) -> &ModelManager {
        &self.mm
    }

    /// The database as a player progress store.
    pub fn progress_store(&self) -> Arc<dyn ProgressStore> {
        Arc::new(self.mm.clone())
    }

    pub fn policy(&self) -> PlayerPolicy {
        self.policy
    }

    pub fn device_buffer(&self) -> usize {
        self.device_buffer
    }

    /// Cancelled when the server shuts down. Player sessions watch child tokens.
    pub fn shutdown(&self) -> &CancellationToken {
        &self.shutdown
    }
}
