use serde::Deserialize;

static CONFIG: OnceCell<Config> = OnceCell::const_new();

mod config_dir;
pub use config_dir::{find_config_file, read_config};

mod error;
pub use error::{ConfigError, ConfigResult};
use tokio::sync::OnceCell;

use crate::player::PlayerPolicy;

#[derive(Debug, Deserialize)]
pub struct Config {
    host: Host,
    app: App,
    #[serde(default)]
    player: Player,
}

#[derive(Debug, Deserialize)]
pub struct Host {
    bindto: String,
}

#[derive(Debug, Deserialize)]
pub struct App {
    jwt: String,
    database_uri: String,
    #[serde(default)]
    docs: bool,
}

/// Tuning for lesson player sessions.
#[derive(Debug, Deserialize)]
pub struct Player {
    #[serde(default = "Player::default_checkpoint_interval")]
    checkpoint_interval_secs: u32,
    #[serde(default = "Player::default_completion_threshold")]
    completion_threshold: f64,
    #[serde(default = "Player::default_device_buffer")]
    device_buffer: usize,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            checkpoint_interval_secs: Self::default_checkpoint_interval(),
            completion_threshold: Self::default_completion_threshold(),
            device_buffer: Self::default_device_buffer(),
        }
    }
}

impl Config {
    #[tracing::instrument]
    pub async fn get_or_init(use_local: bool) -> &'static Config {
        CONFIG
            .get_or_init(|| async {
                let read_cfg = |use_local| -> ConfigResult<Self> {
                    let bytes = read_config(use_local)?;
                    let config: Self = toml::from_slice(&bytes)?;
                    Ok(config)
                };

                match read_cfg(use_local) {
                    Ok(c) => c,
                    Err(e) => {
                        if !matches!(e, error::ConfigError::ConfigNotFound(_)) {
                            crate::error::log_error(&e);
                        }
                        tracing::error!("Config not found.");
                        std::process::exit(1);
                    }
                }
            })
            .await
    }

    #[inline]
    pub fn host(&self) -> &Host {
        &self.host
    }

    #[inline]
    pub fn app(&self) -> &App {
        &self.app
    }

    #[inline]
    pub fn player(&self) -> &Player {
        &self.player
    }
}

impl Host {
    #[inline]
    pub fn bindto(&self) -> &str {
        &self.bindto
    }
}

impl App {
    #[inline]
    pub fn jwt(&self) -> &str {
        &self.jwt
    }

    #[inline]
    pub fn database_uri(&self) -> &str {
        &self.database_uri
    }

    #[inline]
    pub fn docs(&self) -> bool {
        self.docs
    }
}

impl Player {
    fn default_checkpoint_interval() -> u32 {
        10
    }

    fn default_completion_threshold() -> f64 {
        0.9
    }

    fn default_device_buffer() -> usize {
        64
    }

    #[inline]
    pub fn device_buffer(&self) -> usize {
        self.device_buffer.max(1)
    }

    pub fn policy(&self) -> PlayerPolicy {
        PlayerPolicy::new(self.checkpoint_interval_secs, self.completion_threshold)
    }
}
