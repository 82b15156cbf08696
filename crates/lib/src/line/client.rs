//! Reply client: sends a [`Reply`] to the Messaging API.

use crate::line::message::Reply;
use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum ReplyError {
    #[error("line reply request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("line reply api error: {status} {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("line channel access token not configured")]
    MissingToken,
}

/// Anything that can deliver a reply addressed by reply token. One call per reply; no retry.
#[async_trait]
pub trait Replier: Send + Sync {
    async fn reply(&self, reply: &Reply) -> Result<(), ReplyError>;
}

/// Client for the Messaging API reply endpoint.
#[derive(Clone)]
pub struct LineClient {
    base_url: String,
    access_token: Option<String>,
    client: reqwest::Client,
}

impl LineClient {
    pub fn new(base_url: impl Into<String>, access_token: Option<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token,
            client: reqwest::Client::new(),
        }
    }

    /// POST /v2/bot/message/reply.
    pub async fn reply_message(&self, reply: &Reply) -> Result<(), ReplyError> {
        let token = self.access_token.as_ref().ok_or(ReplyError::MissingToken)?;
        let url = format!("{}/v2/bot/message/reply", self.base_url);
        let res = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(reply)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(ReplyError::Api { status, body });
        }
        Ok(())
    }
}

#[async_trait]
impl Replier for LineClient {
    async fn reply(&self, reply: &Reply) -> Result<(), ReplyError> {
        self.reply_message(reply).await
    }
}
