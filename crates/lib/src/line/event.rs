//! Inbound webhook payload: `{ "destination": ..., "events": [...] }`.

use serde::Deserialize;

/// Parsed webhook body. Events keep their delivery order.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookBody {
    #[serde(default)]
    pub destination: Option<String>,
    pub events: Vec<Event>,
}

/// One webhook event, discriminated by `type`. Event types this bot does not
/// handle (follow, unfollow, join, ...) decode to [`Event::Other`].
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Event {
    Message(MessageEvent),
    Postback(PostbackEvent),
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEvent {
    /// Absent for events delivered while the channel is in standby mode.
    #[serde(default)]
    pub reply_token: Option<String>,
    #[serde(default)]
    pub source: Source,
    pub message: MessageContent,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostbackEvent {
    #[serde(default)]
    pub reply_token: Option<String>,
    #[serde(default)]
    pub source: Source,
    pub postback: Postback,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Postback {
    pub data: String,
}

/// Message payload of a message event. Only text is modelled; image, video,
/// sticker, location etc. decode to [`MessageContent::Other`].
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MessageContent {
    Text(TextMessage),
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextMessage {
    #[serde(default)]
    pub id: Option<String>,
    pub text: String,
}

/// Where the event came from: a user, group or room.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub room_id: Option<String>,
}

impl Source {
    /// Id of the conversation the event belongs to (group or room before user).
    pub fn conversation_id(&self) -> Option<&str> {
        self.group_id
            .as_deref()
            .or(self.room_id.as_deref())
            .or(self.user_id.as_deref())
    }
}

impl Event {
    /// `type` as it appeared on the wire, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Message(_) => "message",
            Event::Postback(_) => "postback",
            Event::Other => "other",
        }
    }

    pub fn reply_token(&self) -> Option<&str> {
        match self {
            Event::Message(m) => m.reply_token.as_deref(),
            Event::Postback(p) => p.reply_token.as_deref(),
            Event::Other => None,
        }
    }

    pub fn source(&self) -> Option<&Source> {
        match self {
            Event::Message(m) => Some(&m.source),
            Event::Postback(p) => Some(&p.source),
            Event::Other => None,
        }
    }
}
