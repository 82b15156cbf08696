//! Request handler.

use crate::config::AckMode;
use crate::dispatch::dispatch;
use crate::line::{verify_signature, Replier, Reply, Source, WebhookBody, SIGNATURE_HEADER};
use crate::webhook::context::BotContext;
use crate::webhook::error::WebhookError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use futures_util::future::join_all;
use std::collections::HashMap;

pub const ACK_BODY: &str = "Hello from Lambda!";
pub const SERVER_ERROR_BODY: &str = "Server Error";

/// Raw webhook request: header names are stored lowercase. The body is kept as
/// delivered so the signature is checked against the exact signed bytes.
#[derive(Debug, Clone, Default)]
pub struct InboundRequest {
    headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl InboundRequest {
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        Self {
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// Response to the webhook caller. The body is a JSON string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Acknowledgment {
    pub status: StatusCode,
    pub body: &'static str,
}

impl Acknowledgment {
    pub fn ok() -> Self {
        Self {
            status: StatusCode::OK,
            body: ACK_BODY,
        }
    }

    pub fn server_error() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: SERVER_ERROR_BODY,
        }
    }
}

impl IntoResponse for Acknowledgment {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Verify, parse and dispatch one webhook request.
///
/// With [`AckMode::Await`] the acknowledgment reflects the reply calls: 500 when
/// any failed. With [`AckMode::Immediate`] the calls run on a spawned task and
/// the 200 acknowledgment is returned before they finish.
pub async fn handle_request(
    ctx: &BotContext,
    req: InboundRequest,
) -> Result<Acknowledgment, WebhookError> {
    let request_id = uuid::Uuid::new_v4().to_string();

    let Some(signature) = req
        .header(SIGNATURE_HEADER)
        .filter(|s| !s.trim().is_empty())
    else {
        log::warn!("[{}] webhook rejected: no signature header", request_id);
        return Err(WebhookError::MissingSignature);
    };
    if !verify_signature(&req.body, ctx.channel_secret().as_bytes(), signature) {
        log::warn!("[{}] webhook rejected: signature validation failed", request_id);
        return Err(WebhookError::SignatureMismatch);
    }

    let body: WebhookBody = serde_json::from_slice(&req.body).map_err(|e| {
        log::warn!("[{}] webhook rejected: {}", request_id, e);
        WebhookError::MalformedPayload(e)
    })?;

    let replies: Vec<Reply> = body
        .events
        .iter()
        .filter_map(|event| {
            let reply = dispatch(event, &ctx.config.replies);
            if reply.is_none() {
                log::debug!(
                    "[{}] no reply for {} event from {}",
                    request_id,
                    event.kind(),
                    event
                        .source()
                        .and_then(Source::conversation_id)
                        .unwrap_or("unknown source")
                );
            }
            reply
        })
        .collect();
    log::info!(
        "[{}] {} event(s) for {}, {} reply call(s)",
        request_id,
        body.events.len(),
        body.destination.as_deref().unwrap_or("unknown destination"),
        replies.len()
    );

    match ctx.config.server.ack_mode {
        AckMode::Await => {
            let failures = send_replies(ctx.replier.as_ref(), &replies, &request_id).await;
            if failures == 0 {
                Ok(Acknowledgment::ok())
            } else {
                Ok(Acknowledgment::server_error())
            }
        }
        AckMode::Immediate => {
            if !replies.is_empty() {
                let replier = ctx.replier.clone();
                tokio::spawn(async move {
                    send_replies(replier.as_ref(), &replies, &request_id).await;
                });
            }
            Ok(Acknowledgment::ok())
        }
    }
}

/// Send all replies concurrently. A failed call does not stop the others.
/// Returns the number of failed calls.
pub async fn send_replies(replier: &dyn Replier, replies: &[Reply], request_id: &str) -> usize {
    let results = join_all(replies.iter().map(|reply| async move {
        let result = replier.reply(reply).await;
        (reply, result)
    }))
    .await;

    let mut failures = 0;
    for (reply, result) in results {
        match result {
            Ok(()) => log::info!("[{}] replied to {}", request_id, reply.reply_token),
            Err(e) => {
                failures += 1;
                log::error!(
                    "[{}] reply to {} failed: {}",
                    request_id,
                    reply.reply_token,
                    e
                );
            }
        }
    }
    failures
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::line::{sign_body, ReplyError, ReplyMessage};
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Mutex;

    const SECRET: &str = "channel-secret";

    /// Records every reply; tokens listed in `fail` get an API error.
    #[derive(Default)]
    struct RecordingReplier {
        sent: Mutex<Vec<Reply>>,
        fail: Vec<String>,
    }

    #[async_trait]
    impl Replier for RecordingReplier {
        async fn reply(&self, reply: &Reply) -> Result<(), ReplyError> {
            self.sent.lock().await.push(reply.clone());
            if self.fail.contains(&reply.reply_token) {
                return Err(ReplyError::Api {
                    status: StatusCode::BAD_REQUEST,
                    body: "Invalid reply token".to_string(),
                });
            }
            Ok(())
        }
    }

    fn context(ack_mode: AckMode, replier: Arc<RecordingReplier>) -> BotContext {
        let mut config = Config::default();
        config.server.ack_mode = ack_mode;
        BotContext::new(config, SECRET, replier)
    }

    fn signed(body: &str) -> InboundRequest {
        InboundRequest::new(body)
            .with_header("X-Line-Signature", sign_body(body.as_bytes(), SECRET.as_bytes()))
    }

    const HI_BODY: &str = r#"{"events":[{"type":"message","message":{"type":"text","text":"hi"},"replyToken":"tok1","source":{"userId":"u1"}}]}"#;

    #[test]
    fn header_lookup_is_case_insensitive() {
        let req = InboundRequest::new("").with_header("X-Line-Signature", "abc");
        assert_eq!(req.header("x-line-signature"), Some("abc"));
        assert_eq!(req.header("X-LINE-SIGNATURE"), Some("abc"));
        assert_eq!(req.header("content-type"), None);
    }

    #[tokio::test]
    async fn echoes_text_and_acknowledges() {
        let replier = Arc::new(RecordingReplier::default());
        let ctx = context(AckMode::Await, replier.clone());
        let ack = handle_request(&ctx, signed(HI_BODY)).await.unwrap();
        assert_eq!(ack, Acknowledgment::ok());
        assert_eq!(ack.body, "Hello from Lambda!");

        let sent = replier.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0], Reply::single("tok1", ReplyMessage::text("hi")));
    }

    #[tokio::test]
    async fn missing_signature_is_rejected_before_parsing() {
        let replier = Arc::new(RecordingReplier::default());
        let ctx = context(AckMode::Await, replier.clone());
        let err = handle_request(&ctx, InboundRequest::new("not even json"))
            .await
            .unwrap_err();
        assert!(matches!(err, WebhookError::MissingSignature));
        assert!(replier.sent.lock().await.is_empty());
    }

    #[tokio::test]
    async fn blank_signature_header_counts_as_missing() {
        let replier = Arc::new(RecordingReplier::default());
        let ctx = context(AckMode::Await, replier.clone());
        for value in ["", "   "] {
            let req = InboundRequest::new(HI_BODY).with_header("x-line-signature", value);
            let err = handle_request(&ctx, req).await.unwrap_err();
            assert!(matches!(err, WebhookError::MissingSignature));
            assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        }
        assert!(replier.sent.lock().await.is_empty());
    }

    #[tokio::test]
    async fn padded_signature_is_rejected() {
        let replier = Arc::new(RecordingReplier::default());
        let ctx = context(AckMode::Await, replier.clone());
        let sig = sign_body(HI_BODY.as_bytes(), SECRET.as_bytes());
        let req =
            InboundRequest::new(HI_BODY).with_header("x-line-signature", format!(" {}\n", sig));
        let err = handle_request(&ctx, req).await.unwrap_err();
        assert!(matches!(err, WebhookError::SignatureMismatch));
    }

    #[tokio::test]
    async fn bad_signature_is_rejected() {
        let replier = Arc::new(RecordingReplier::default());
        let ctx = context(AckMode::Await, replier.clone());
        let req = InboundRequest::new(HI_BODY)
            .with_header("x-line-signature", sign_body(HI_BODY.as_bytes(), b"other-secret"));
        let err = handle_request(&ctx, req).await.unwrap_err();
        assert!(matches!(err, WebhookError::SignatureMismatch));
        assert!(replier.sent.lock().await.is_empty());
    }

    #[tokio::test]
    async fn malformed_body_is_rejected() {
        let replier = Arc::new(RecordingReplier::default());
        let ctx = context(AckMode::Await, replier.clone());
        let err = handle_request(&ctx, signed(r#"{"events": "nope"}"#))
            .await
            .unwrap_err();
        assert!(matches!(err, WebhookError::MalformedPayload(_)));
    }

    #[tokio::test]
    async fn signed_non_utf8_body_is_malformed() {
        let replier = Arc::new(RecordingReplier::default());
        let ctx = context(AckMode::Await, replier.clone());
        let body: &[u8] = b"{\"events\":[\xff\xfe]}";
        let req = InboundRequest::new(body)
            .with_header("x-line-signature", sign_body(body, SECRET.as_bytes()));
        let err = handle_request(&ctx, req).await.unwrap_err();
        assert!(matches!(err, WebhookError::MalformedPayload(_)));
    }

    #[tokio::test]
    async fn standby_event_does_not_block_the_batch() {
        let replier = Arc::new(RecordingReplier::default());
        let ctx = context(AckMode::Await, replier.clone());
        let body = r#"{"destination":"Ubot","events":[
            {"type":"message","mode":"standby","source":{"userId":"u"},"message":{"type":"text","text":"quiet"}},
            {"type":"message","mode":"active","replyToken":"tok1","source":{"userId":"u"},"message":{"type":"text","text":"hi"}}
        ]}"#;
        let ack = handle_request(&ctx, signed(body)).await.unwrap();
        assert_eq!(ack, Acknowledgment::ok());

        let sent = replier.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0], Reply::single("tok1", ReplyMessage::text("hi")));
    }

    #[tokio::test]
    async fn ignored_events_send_nothing() {
        let replier = Arc::new(RecordingReplier::default());
        let ctx = context(AckMode::Await, replier.clone());
        let body = r#"{"events":[{"type":"follow","replyToken":"t","source":{"userId":"u"}},{"type":"postback","replyToken":"t2","source":{"userId":"u"},"postback":{"data":"other"}}]}"#;
        let ack = handle_request(&ctx, signed(body)).await.unwrap();
        assert_eq!(ack, Acknowledgment::ok());
        assert!(replier.sent.lock().await.is_empty());
    }

    #[tokio::test]
    async fn one_failed_reply_does_not_stop_siblings() {
        let replier = Arc::new(RecordingReplier {
            sent: Mutex::new(Vec::new()),
            fail: vec!["bad".to_string()],
        });
        let ctx = context(AckMode::Await, replier.clone());
        let body = r#"{"events":[
            {"type":"message","replyToken":"bad","source":{"userId":"u"},"message":{"type":"text","text":"a"}},
            {"type":"postback","replyToken":"good","source":{"userId":"u"},"postback":{"data":"sticker"}}
        ]}"#;
        let ack = handle_request(&ctx, signed(body)).await.unwrap();
        assert_eq!(ack, Acknowledgment::server_error());
        assert_eq!(ack.body, "Server Error");

        let sent = replier.sent.lock().await;
        let mut tokens: Vec<&str> = sent.iter().map(|r| r.reply_token.as_str()).collect();
        tokens.sort();
        assert_eq!(tokens, vec!["bad", "good"]);
    }

    #[tokio::test]
    async fn immediate_mode_acknowledges_despite_failures() {
        let replier = Arc::new(RecordingReplier {
            sent: Mutex::new(Vec::new()),
            fail: vec!["tok1".to_string()],
        });
        let ctx = context(AckMode::Immediate, replier.clone());
        let ack = handle_request(&ctx, signed(HI_BODY)).await.unwrap();
        assert_eq!(ack, Acknowledgment::ok());

        for _ in 0..100 {
            if !replier.sent.lock().await.is_empty() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("spawned reply was never sent");
    }

    #[tokio::test]
    async fn send_replies_counts_failures() {
        let replier = RecordingReplier {
            sent: Mutex::new(Vec::new()),
            fail: vec!["x".to_string(), "y".to_string()],
        };
        let replies = vec![
            Reply::single("x", ReplyMessage::text("1")),
            Reply::single("y", ReplyMessage::text("2")),
            Reply::single("z", ReplyMessage::text("3")),
        ];
        assert_eq!(send_replies(&replier, &replies, "req").await, 2);
        assert_eq!(send_replies(&replier, &[], "req").await, 0);
    }
}
