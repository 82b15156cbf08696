//! Webhook request handling: verify, parse, dispatch, reply, acknowledge.
//!
//! [`handle_request`] is independent of the HTTP framework; the axum route in
//! [`crate::server`] only converts to and from [`InboundRequest`] and [`Acknowledgment`].

mod context;
mod error;
mod handler;

pub use context::BotContext;
pub use error::{ErrorResponse, WebhookError};
pub use handler::{handle_request, send_replies, Acknowledgment, InboundRequest};
