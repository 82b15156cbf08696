//! Outbound message objects for the reply API. Field names and `type` tags
//! follow the Messaging API JSON schema, so these serialize straight onto the wire.

use serde::Serialize;

/// Body of `POST /v2/bot/message/reply`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    pub reply_token: String,
    pub messages: Vec<ReplyMessage>,
}

impl Reply {
    pub fn single(reply_token: impl Into<String>, message: ReplyMessage) -> Self {
        Self {
            reply_token: reply_token.into(),
            messages: vec![message],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReplyMessage {
    #[serde(rename_all = "camelCase")]
    Text {
        text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        quick_reply: Option<QuickReply>,
    },
    #[serde(rename_all = "camelCase")]
    Sticker {
        package_id: String,
        sticker_id: String,
    },
    /// Flex message; `contents` is a bubble or carousel container.
    #[serde(rename_all = "camelCase")]
    Flex {
        alt_text: String,
        contents: serde_json::Value,
    },
}

impl ReplyMessage {
    pub fn text(text: impl Into<String>) -> Self {
        ReplyMessage::Text {
            text: text.into(),
            quick_reply: None,
        }
    }

    pub fn text_with_quick_reply(text: impl Into<String>, quick_reply: QuickReply) -> Self {
        ReplyMessage::Text {
            text: text.into(),
            quick_reply: Some(quick_reply),
        }
    }

    pub fn sticker(package_id: impl Into<String>, sticker_id: impl Into<String>) -> Self {
        ReplyMessage::Sticker {
            package_id: package_id.into(),
            sticker_id: sticker_id.into(),
        }
    }

    pub fn flex(alt_text: impl Into<String>, contents: serde_json::Value) -> Self {
        ReplyMessage::Flex {
            alt_text: alt_text.into(),
            contents,
        }
    }
}

/// Suggested follow-up buttons shown under a message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuickReply {
    pub items: Vec<QuickReplyItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuickReplyItem {
    #[serde(rename = "type")]
    pub typ: String,
    pub action: QuickReplyAction,
}

impl QuickReplyItem {
    pub fn new(action: QuickReplyAction) -> Self {
        Self {
            typ: "action".to_string(),
            action,
        }
    }

    /// Button that sends `text` as a message from the user when tapped.
    pub fn message(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(QuickReplyAction::Message {
            label: label.into(),
            text: text.into(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum QuickReplyAction {
    Message {
        label: String,
        text: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_message_wire_shape() {
        let v = serde_json::to_value(ReplyMessage::text("hi")).unwrap();
        assert_eq!(v, json!({ "type": "text", "text": "hi" }));
    }

    #[test]
    fn sticker_message_wire_shape() {
        let v = serde_json::to_value(ReplyMessage::sticker("11537", "52002735")).unwrap();
        assert_eq!(
            v,
            json!({ "type": "sticker", "packageId": "11537", "stickerId": "52002735" })
        );
    }

    #[test]
    fn quick_reply_wire_shape() {
        let msg = ReplyMessage::text_with_quick_reply(
            "ok?",
            QuickReply {
                items: vec![
                    QuickReplyItem::message("Yes", "yes!"),
                    QuickReplyItem::message("No", "no!"),
                ],
            },
        );
        let v = serde_json::to_value(msg).unwrap();
        assert_eq!(
            v,
            json!({
                "type": "text",
                "text": "ok?",
                "quickReply": {
                    "items": [
                        { "type": "action", "action": { "type": "message", "label": "Yes", "text": "yes!" } },
                        { "type": "action", "action": { "type": "message", "label": "No", "text": "no!" } }
                    ]
                }
            })
        );
    }

    #[test]
    fn reply_body_wire_shape() {
        let reply = Reply::single("tok1", ReplyMessage::text("hi"));
        let v = serde_json::to_value(&reply).unwrap();
        assert_eq!(
            v,
            json!({ "replyToken": "tok1", "messages": [{ "type": "text", "text": "hi" }] })
        );
    }

    #[test]
    fn flex_message_wire_shape() {
        let msg = ReplyMessage::flex("alt", json!({ "type": "carousel", "contents": [] }));
        let v = serde_json::to_value(msg).unwrap();
        assert_eq!(v["type"], "flex");
        assert_eq!(v["altText"], "alt");
        assert_eq!(v["contents"]["type"], "carousel");
    }
}
