//! Event dispatch: decide which reply, if any, an incoming event gets.
//!
//! Pure function of the event and the reply keywords; sending is the caller's job.

use crate::config::RepliesConfig;
use crate::line::{
    flex, Event, MessageContent, MessageEvent, PostbackEvent, QuickReply, QuickReplyItem, Reply,
    ReplyMessage,
};

/// Postback data that asks for the sticker.
pub const STICKER_POSTBACK_DATA: &str = "sticker";
pub const STICKER_PACKAGE_ID: &str = "11537";
pub const STICKER_ID: &str = "52002735";

pub const TRAINING_PROMPT: &str = "案内されたトレーニングはやったんか❓YesかNoで答えてや❗️";
pub const TRAINING_DONE_TEXT: &str = "トレーニングやったよ。えらいでしょ🙆";
pub const TRAINING_SKIPPED_TEXT: &str = "今回のトレーニングはパスで。ごめんな🙅";
pub const POINT_BALANCE_TEXT: &str = "あんたの今のポイントは【９５Ｐ】やで🙌";

/// Returns the reply for `event`, or `None` when the event is ignored or
/// carries no reply token (standby mode).
pub fn dispatch(event: &Event, replies: &RepliesConfig) -> Option<Reply> {
    let message = match event {
        Event::Postback(postback) => postback_reply(postback),
        Event::Message(message) => message_reply(message, replies),
        Event::Other => None,
    }?;
    let Some(reply_token) = event.reply_token() else {
        log::debug!("{} event has no reply token, not replying", event.kind());
        return None;
    };
    Some(Reply::single(reply_token, message))
}

fn postback_reply(event: &PostbackEvent) -> Option<ReplyMessage> {
    if event.postback.data != STICKER_POSTBACK_DATA {
        log::debug!("no handler for postback data {:?}", event.postback.data);
        return None;
    }
    Some(ReplyMessage::sticker(STICKER_PACKAGE_ID, STICKER_ID))
}

fn message_reply(event: &MessageEvent, replies: &RepliesConfig) -> Option<ReplyMessage> {
    let MessageContent::Text(ref message) = event.message else {
        log::debug!("ignoring non-text message");
        return None;
    };
    let text = message.text.as_str();
    let reply = if text == replies.training_keyword {
        training_prompt()
    } else if text == replies.point_keyword {
        ReplyMessage::text(POINT_BALANCE_TEXT)
    } else if replies.carousel_keyword.as_deref() == Some(text) {
        ReplyMessage::flex(flex::PRODUCT_CAROUSEL_ALT_TEXT, flex::product_carousel())
    } else {
        ReplyMessage::text(text)
    };
    Some(reply)
}

/// Yes/No question; each quick reply sends its answer back as a user message.
fn training_prompt() -> ReplyMessage {
    ReplyMessage::text_with_quick_reply(
        TRAINING_PROMPT,
        QuickReply {
            items: vec![
                QuickReplyItem::message("Yes", TRAINING_DONE_TEXT),
                QuickReplyItem::message("No", TRAINING_SKIPPED_TEXT),
            ],
        },
    )
}
