//! `glsld-server` (§4.J, §5, §6): the reader-thread/worker-pool core behind
//! the language server, speaking the hand-rolled `Content-Length` transport
//! over whatever `Read`/`Write` pair the caller hands in — real `stdio` for
//! `glsld-bin`, an in-memory pipe in tests.

mod capabilities;
mod dispatch;
mod edit;
mod pool;
mod protocol;
mod registry;
mod transport;
mod uri;

use std::io::{BufRead, BufReader, Read, Write};
use std::sync::Arc;

use crossbeam_channel::unbounded;

use dispatch::{OutgoingFrame, ServerContext};
use protocol::IncomingMessage;

pub use glsl_config::Config;

/// Runs the server to completion: reads frames from `input` on the calling
/// thread (§5: "single reader thread"), dispatching each onto `ctx`'s
/// worker pool, and writes every response/notification the pool produces to
/// `output` as they arrive. Returns once `input` hits EOF or an `exit`
/// notification is received.
pub fn run(input: impl Read, output: impl Write + Send + 'static, config: Config) {
    let ctx = Arc::new(ServerContext::new(config));
    let (out_tx, out_rx) = unbounded::<OutgoingFrame>();

    let writer_handle = std::thread::spawn(move || {
        let mut output = output;
        for frame in out_rx.iter() {
            let body = match frame {
                OutgoingFrame::Response(r) => serde_json::to_vec(&r),
                OutgoingFrame::Notification(n) => serde_json::to_vec(&n),
            };
            match body {
                Ok(body) => {
                    if transport::write_message(&mut output, &body).is_err() {
                        break;
                    }
                }
                Err(err) => tracing::error!(target: "glsld", error = %err, "failed to serialize outgoing frame"),
            }
        }
    });

    let mut reader = BufReader::new(input);
    loop {
        let frame = match transport::read_message(&mut reader) {
            Ok(frame) => frame,
            Err(transport::TransportError::Eof) => break,
            Err(err) => {
                tracing::warn!(target: "glsld", error = %err, "malformed frame, closing stream");
                break;
            }
        };
        match protocol::parse_incoming(&frame) {
            Ok(IncomingMessage::Request(req)) => {
                if req.method == "exit" {
                    break;
                }
                dispatch::handle_request(&ctx, &out_tx, req);
            }
            Ok(IncomingMessage::Notification(note)) => {
                let is_exit = note.method == "exit";
                dispatch::handle_notification(&ctx, &out_tx, note);
                if is_exit {
                    break;
                }
            }
            Err(err) => {
                tracing::warn!(target: "glsld", error = %err, "dropping malformed JSON-RPC frame");
            }
        }
    }

    drop(out_tx);
    let _ = writer_handle.join();
}

/// Test-only seam: run the dispatch layer directly against a pre-built
/// context, bypassing the transport. Exposed so `glsld-server`'s own tests
/// can drive a handful of methods end to end without a real pipe.
#[cfg(test)]
pub(crate) fn test_context(config: Config) -> Arc<ServerContext> {
    Arc::new(ServerContext::new(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{IncomingMessage, RequestMessage};
    use serde_json::json;

    fn drain(rx: &crossbeam_channel::Receiver<OutgoingFrame>, timeout: std::time::Duration) -> Vec<OutgoingFrame> {
        let mut out = Vec::new();
        while let Ok(frame) = rx.recv_timeout(timeout) {
            out.push(frame);
        }
        out
    }

    #[test]
    fn initialize_then_hover_round_trip() {
        let ctx = test_context(Config::default());
        let (tx, rx) = unbounded();

        dispatch::handle_request(
            &ctx,
            &tx,
            RequestMessage { jsonrpc: None, id: json!(1), method: "initialize".into(), params: json!({}) },
        );
        let frames = drain(&rx, std::time::Duration::from_millis(200));
        assert_eq!(frames.len(), 1);

        dispatch::handle_notification(
            &ctx,
            &tx,
            crate::protocol::NotificationMessage {
                jsonrpc: None,
                method: "textDocument/didOpen".into(),
                params: json!({
                    "textDocument": { "uri": "file:///a.frag", "version": 1, "text": "void main() { float x = 1.0; }" }
                }),
            },
        );
        let frames = drain(&rx, std::time::Duration::from_millis(500));
        assert!(frames.iter().any(|f| matches!(f, OutgoingFrame::Notification(n) if n.method == "textDocument/publishDiagnostics")));

        dispatch::handle_request(
            &ctx,
            &tx,
            RequestMessage {
                jsonrpc: None,
                id: json!(2),
                method: "textDocument/hover".into(),
                params: json!({ "textDocument": { "uri": "file:///a.frag" }, "position": { "line": 0, "character": 18 } }),
            },
        );
        let frames = drain(&rx, std::time::Duration::from_millis(500));
        assert_eq!(frames.len(), 1);
        match &frames[0] {
            OutgoingFrame::Response(r) => assert!(r.result.is_some()),
            _ => panic!("expected a response"),
        }
    }

    #[test]
    fn unknown_method_reports_method_not_found() {
        let ctx = test_context(Config::default());
        let (tx, rx) = unbounded();
        dispatch::handle_request(
            &ctx,
            &tx,
            RequestMessage { jsonrpc: None, id: json!(1), method: "textDocument/bogus".into(), params: json!({}) },
        );
        let frames = drain(&rx, std::time::Duration::from_millis(200));
        assert_eq!(frames.len(), 1);
        match &frames[0] {
            OutgoingFrame::Response(r) => assert!(r.error.is_some()),
            _ => panic!("expected a response"),
        }
    }

    #[test]
    fn parse_incoming_distinguishes_requests_from_notifications() {
        let req = protocol::parse_incoming(br#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#).unwrap();
        assert!(matches!(req, IncomingMessage::Request(_)));
        let note = protocol::parse_incoming(br#"{"jsonrpc":"2.0","method":"initialized","params":{}}"#).unwrap();
        assert!(matches!(note, IncomingMessage::Notification(_)));
    }
}
