//! Method dispatch (§4.J, §7): one `match` over the method name, not a
//! generated table — every arm either handles a text-sync notification
//! inline (fast: swap the registry entry, enqueue a compile job) or
//! enqueues a feature request onto the worker pool, which waits on the
//! document's `BackgroundCompilation` before running the handler.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use crossbeam_channel::Sender;
use serde_json::{json, Value};

use glsl_compile::CompilerInvocation;
use glsl_config::Config;

use crate::edit;
use crate::pool::WorkerPool;
use crate::protocol::{
    self, DidChangeTextDocumentParams, DidCloseTextDocumentParams, DidOpenTextDocumentParams,
    NotificationMessage, OutgoingNotification, ReferenceParams, RequestMessage, ResponseError, ResponseMessage,
    TextDocumentPositionParams,
};
use crate::registry::DocumentRegistry;

/// The timeout a feature request waits on a document's in-flight compile
/// before answering with an empty result (§5: "1 second, no cancellation
/// protocol").
const WAIT_AVAILABLE_TIMEOUT: Duration = Duration::from_secs(1);

pub enum OutgoingFrame {
    Response(ResponseMessage),
    Notification(OutgoingNotification),
}

pub struct ServerContext {
    pub registry: DocumentRegistry,
    pub pool: WorkerPool,
    pub config: RwLock<Config>,
}

impl ServerContext {
    pub fn new(config: Config) -> Self {
        Self { registry: DocumentRegistry::new(), pool: WorkerPool::with_default_size(), config: RwLock::new(config) }
    }

    fn stage(&self) -> Option<glsl_compile::ShaderStage> {
        self.config.read().unwrap().file.language_config.shader_stage()
    }
}

/// Schedules a compile of `source` for `uri` at `version`, publishing onto
/// `entry` when done and then emitting `publishDiagnostics` — the only
/// notification a compile job sends unprompted.
fn schedule_compile(
    ctx: Arc<ServerContext>,
    out: Sender<OutgoingFrame>,
    uri: String,
    version: i32,
    source: String,
) {
    let entry = ctx.registry.open_or_update(uri.clone(), version, source.clone());
    let stage = ctx.stage();
    let job_ctx = Arc::clone(&ctx);
    ctx.pool.spawn(move || {
        let mut invocation = CompilerInvocation::new();
        invocation.set_main_file_from_buffer(source).set_count_utf16_characters(true).set_stage(stage);
        match invocation.compile_main_file() {
            Ok(result) => {
                let result = Arc::new(result);
                entry.publish(Arc::clone(&result));
                let diagnostics = {
                    let config = job_ctx.config.read().unwrap();
                    glsl_features::diagnostics(&result, &config)
                };
                let params = protocol::PublishDiagnosticsParams {
                    uri,
                    diagnostics: diagnostics
                        .into_iter()
                        .map(|d| protocol::Diagnostic {
                            range: d.range.into(),
                            severity: protocol::lsp_diagnostic_severity(d.severity),
                            code: d.code,
                            message: d.text,
                        })
                        .collect(),
                };
                let _ = out.send(OutgoingFrame::Notification(OutgoingNotification::new(
                    "textDocument/publishDiagnostics",
                    serde_json::to_value(params).unwrap(),
                )));
            }
            Err(err) => {
                tracing::error!(target: "glsld", uri, error = %err, "compile failed");
            }
        }
    });
}

pub fn handle_notification(ctx: &Arc<ServerContext>, out: &Sender<OutgoingFrame>, msg: NotificationMessage) {
    match msg.method.as_str() {
        "initialized" | "$/cancelRequest" | "exit" => {}
        "textDocument/didOpen" => {
            let Ok(params): Result<DidOpenTextDocumentParams, _> = serde_json::from_value(msg.params) else {
                tracing::warn!(target: "glsld", "invalid didOpen params");
                return;
            };
            let uri = crate::uri::normalize(&params.text_document.uri);
            schedule_compile(Arc::clone(ctx), out.clone(), uri, params.text_document.version, params.text_document.text);
        }
        "textDocument/didChange" => {
            let Ok(params): Result<DidChangeTextDocumentParams, _> = serde_json::from_value(msg.params) else {
                tracing::warn!(target: "glsld", "invalid didChange params");
                return;
            };
            let uri = crate::uri::normalize(&params.text_document.uri);
            let Some(existing) = ctx.registry.get(&uri) else {
                tracing::warn!(target: "glsld", uri, "didChange for unknown document");
                return;
            };
            let new_source = edit::apply_changes(&existing.source, &params.content_changes);
            schedule_compile(Arc::clone(ctx), out.clone(), uri, params.text_document.version, new_source);
        }
        "textDocument/didClose" => {
            let Ok(params): Result<DidCloseTextDocumentParams, _> = serde_json::from_value(msg.params) else {
                return;
            };
            ctx.registry.close(&crate::uri::normalize(&params.text_document.uri));
        }
        other => {
            tracing::debug!(target: "glsld", method = other, "dropping unknown notification");
        }
    }
}

pub fn handle_request(ctx: &Arc<ServerContext>, out: &Sender<OutgoingFrame>, msg: RequestMessage) {
    let id = msg.id.clone();
    match msg.method.as_str() {
        "initialize" => {
            let caps = crate::capabilities::server_capabilities(&ctx.config.read().unwrap());
            let result = json!({ "capabilities": caps, "serverInfo": { "name": "glsld-server" } });
            let _ = out.send(OutgoingFrame::Response(ResponseMessage::success(id, result)));
        }
        "shutdown" => {
            let _ = out.send(OutgoingFrame::Response(ResponseMessage::success(id, Value::Null)));
        }
        "textDocument/completion" => dispatch_position(ctx, out, id, msg.params, |result, pos| {
            let list = glsl_features::completion(result, pos);
            json!(protocol::CompletionList {
                is_incomplete: list.is_incomplete,
                items: list
                    .items
                    .into_iter()
                    .map(|i| protocol::CompletionItem {
                        label: i.label,
                        kind: protocol::lsp_completion_item_kind(i.kind),
                        detail: i.detail,
                        text_edit: i.text_edit.map(|e| protocol::TextEdit { range: e.range.into(), new_text: e.new_text }),
                    })
                    .collect(),
            })
        }),
        "textDocument/hover" => dispatch_position(ctx, out, id, msg.params, |result, pos| match glsl_features::hover(result, pos) {
            Some(h) => json!(protocol::Hover { contents: protocol::HoverContents { kind: "plaintext", value: h.contents } }),
            None => Value::Null,
        }),
        "textDocument/signatureHelp" => dispatch_position(ctx, out, id, msg.params, |result, pos| {
            match glsl_features::signature_help(result, pos) {
                Some(help) => json!(protocol::SignatureHelp {
                    signatures: help
                        .signatures
                        .into_iter()
                        .map(|s| protocol::SignatureInformation {
                            label: s.label,
                            parameters: s.parameters.into_iter().map(|p| protocol::ParameterInformation { label: p.label }).collect(),
                        })
                        .collect(),
                    active_signature: help.active_signature,
                    active_parameter: help.active_parameter,
                }),
                None => Value::Null,
            }
        }),
        "textDocument/declaration" | "textDocument/definition" => {
            dispatch_position_with_uri(ctx, out, id, msg.params, |result, pos, uri| match glsl_features::definition(result, pos) {
                Some(range) => json!(protocol::Location { uri, range: range.into() }),
                None => Value::Null,
            })
        }
        "textDocument/references" => {
            let Ok(params): Result<ReferenceParams, _> = serde_json::from_value(msg.params) else {
                send_invalid_params(out, id);
                return;
            };
            let uri = crate::uri::normalize(&params.text_document.uri);
            run_with_document(ctx, out, id, uri.clone(), move |result, id, out| {
                let locations: Vec<_> = glsl_features::references(result, params.position.into(), params.context.include_declaration)
                    .into_iter()
                    .map(|range| protocol::Location { uri: uri.clone(), range: range.into() })
                    .collect();
                let _ = out.send(OutgoingFrame::Response(ResponseMessage::success(id, json!(locations))));
            });
        }
        "textDocument/documentSymbol" => dispatch_document(ctx, out, id, msg.params, |result| {
            json!(glsl_features::document_symbols(result).into_iter().map(to_wire_symbol).collect::<Vec<_>>())
        }),
        "textDocument/foldingRange" => dispatch_document(ctx, out, id, msg.params, |result| {
            json!(glsl_features::folding_ranges(result)
                .into_iter()
                .map(|f| protocol::FoldingRange { start_line: f.start_line, end_line: f.end_line })
                .collect::<Vec<_>>())
        }),
        "textDocument/semanticTokens/full" => dispatch_document(ctx, out, id, msg.params, |result| {
            let tokens = glsl_features::semantic_tokens(result);
            json!(protocol::SemanticTokens { data: glsl_features::encode_deltas(&tokens) })
        }),
        "textDocument/inlayHint" => {
            let config = ctx.config.read().unwrap().clone();
            dispatch_document(ctx, out, id, msg.params, move |result| {
                json!(glsl_features::inlay_hints(result, &config)
                    .into_iter()
                    .map(|h| protocol::InlayHint {
                        position: h.position.into(),
                        label: h.label,
                        kind: protocol::lsp_inlay_hint_kind(h.kind),
                    })
                    .collect::<Vec<_>>())
            })
        }
        other => {
            tracing::warn!(target: "glsld", method = other, "method not found");
            let _ = out.send(OutgoingFrame::Response(ResponseMessage::failure(
                id,
                ResponseError { code: protocol::ERR_METHOD_NOT_FOUND, message: format!("method not found: {other}") },
            )));
        }
    }
}

fn send_invalid_params(out: &Sender<OutgoingFrame>, id: Value) {
    let _ = out.send(OutgoingFrame::Response(ResponseMessage::failure(
        id,
        ResponseError { code: protocol::ERR_INVALID_PARAMS, message: "invalid params".into() },
    )));
}

fn to_wire_symbol(s: glsl_features::DocumentSymbol) -> protocol::DocumentSymbol {
    protocol::DocumentSymbol {
        name: s.name,
        kind: protocol::lsp_symbol_kind(s.kind),
        range: s.range.into(),
        selection_range: s.selection_range.into(),
        children: s.children.into_iter().map(to_wire_symbol).collect(),
    }
}

/// Runs `handler` on the background pool once `uri`'s document is available,
/// sending the response it produces. A missing document (closed, or never
/// opened) fails the request with "invalid params" rather than hanging.
fn run_with_document(
    ctx: &Arc<ServerContext>,
    out: &Sender<OutgoingFrame>,
    id: Value,
    uri: String,
    handler: impl FnOnce(&glsl_compile::CompilerResult, Value, &Sender<OutgoingFrame>) + Send + 'static,
) {
    let Some(entry) = ctx.registry.get(&uri) else {
        send_invalid_params(out, id);
        return;
    };
    let out = out.clone();
    ctx.pool.spawn(move || match entry.wait_available(WAIT_AVAILABLE_TIMEOUT) {
        Some(result) => handler(&result, id, &out),
        None => {
            let _ = out.send(OutgoingFrame::Response(ResponseMessage::success(id, Value::Null)));
        }
    });
}

fn dispatch_position(
    ctx: &Arc<ServerContext>,
    out: &Sender<OutgoingFrame>,
    id: Value,
    params: Value,
    to_result: impl Fn(&glsl_compile::CompilerResult, glsl_atom::TextPosition) -> Value + Send + Sync + 'static,
) {
    let Ok(params): Result<TextDocumentPositionParams, _> = serde_json::from_value(params) else {
        send_invalid_params(out, id);
        return;
    };
    let uri = crate::uri::normalize(&params.text_document.uri);
    run_with_document(ctx, out, id, uri, move |result, id, out| {
        let value = to_result(result, params.position.into());
        let _ = out.send(OutgoingFrame::Response(ResponseMessage::success(id, value)));
    });
}

fn dispatch_position_with_uri(
    ctx: &Arc<ServerContext>,
    out: &Sender<OutgoingFrame>,
    id: Value,
    params: Value,
    to_result: impl Fn(&glsl_compile::CompilerResult, glsl_atom::TextPosition, String) -> Value + Send + Sync + 'static,
) {
    let Ok(params): Result<TextDocumentPositionParams, _> = serde_json::from_value(params) else {
        send_invalid_params(out, id);
        return;
    };
    let uri = crate::uri::normalize(&params.text_document.uri);
    let uri_for_result = uri.clone();
    run_with_document(ctx, out, id, uri, move |result, id, out| {
        let value = to_result(result, params.position.into(), uri_for_result);
        let _ = out.send(OutgoingFrame::Response(ResponseMessage::success(id, value)));
    });
}

fn dispatch_document(
    ctx: &Arc<ServerContext>,
    out: &Sender<OutgoingFrame>,
    id: Value,
    params: Value,
    to_result: impl Fn(&glsl_compile::CompilerResult) -> Value + Send + Sync + 'static,
) {
    let Ok(params): Result<crate::protocol::TextDocumentIdentifierParams, _> = serde_json::from_value(params) else {
        send_invalid_params(out, id);
        return;
    };
    let uri = crate::uri::normalize(&params.text_document.uri);
    run_with_document(ctx, out, id, uri, move |result, id, out| {
        let value = to_result(result);
        let _ = out.send(OutgoingFrame::Response(ResponseMessage::success(id, value)));
    });
}
