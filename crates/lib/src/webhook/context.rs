//! Process-wide handler context: config, channel secret and reply client,
//! built once at startup and shared by every request.

use crate::config::{self, Config};
use crate::line::{LineClient, Replier};
use anyhow::Result;
use std::sync::Arc;

pub struct BotContext {
    pub config: Arc<Config>,
    channel_secret: String,
    pub replier: Arc<dyn Replier>,
}

impl BotContext {
    pub fn new(config: Config, channel_secret: impl Into<String>, replier: Arc<dyn Replier>) -> Self {
        Self {
            config: Arc::new(config),
            channel_secret: channel_secret.into(),
            replier,
        }
    }

    /// Resolve credentials from env/config and build a [`LineClient`]. Refuses to start without a channel secret.
    pub fn from_config(config: Config) -> Result<Self> {
        let Some(secret) = config::resolve_channel_secret(&config) else {
            anyhow::bail!(
                "channel secret not configured (set line.channelSecret or MSG_CHANNEL_SECRET)"
            );
        };
        let token = config::resolve_channel_access_token(&config);
        if token.is_none() {
            log::warn!("channel access token not configured; reply calls will fail");
        }
        let client = LineClient::new(config::resolve_api_base_url(&config), token);
        Ok(Self::new(config, secret, Arc::new(client)))
    }

    pub fn channel_secret(&self) -> &str {
        &self.channel_secret
    }
}
