//! LINE Messaging API: webhook signature, inbound event types, outbound reply
//! messages and the reply client.

mod client;
mod event;
pub mod flex;
mod message;
mod signature;

pub use client::{LineClient, Replier, ReplyError};
pub use event::{
    Event, MessageContent, MessageEvent, Postback, PostbackEvent, Source, TextMessage, WebhookBody,
};
pub use message::{QuickReply, QuickReplyAction, QuickReplyItem, Reply, ReplyMessage};
pub use signature::{compute_signature, sign_body, verify_signature, SIGNATURE_HEADER};
