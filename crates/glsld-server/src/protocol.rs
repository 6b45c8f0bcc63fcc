//! Wire types (§6): the JSON-RPC envelope plus the LSP request/response
//! shapes this server actually speaks. Hand-rolled against `serde_json`
//! rather than pulled in from `lsp-types`, per the transport design this
//! crate follows — a generated stub isn't in the cards when the framing
//! itself is hand-rolled too.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";

#[derive(Debug, Clone, Deserialize)]
pub struct RequestMessage {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    pub id: Value,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationMessage {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

/// An incoming frame is a request if it carries an `id`, a notification
/// otherwise — checked by peeking at the raw JSON before picking which
/// typed struct to deserialize into.
#[derive(Debug, Clone)]
pub enum IncomingMessage {
    Request(RequestMessage),
    Notification(NotificationMessage),
}

pub fn parse_incoming(raw: &[u8]) -> serde_json::Result<IncomingMessage> {
    let value: Value = serde_json::from_slice(raw)?;
    if value.get("id").is_some() {
        Ok(IncomingMessage::Request(serde_json::from_value(value)?))
    } else {
        Ok(IncomingMessage::Notification(serde_json::from_value(value)?))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseMessage {
    pub jsonrpc: &'static str,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ResponseError>,
}

impl ResponseMessage {
    pub fn success(id: Value, result: Value) -> Self {
        Self { jsonrpc: JSONRPC_VERSION, id, result: Some(result), error: None }
    }

    pub fn failure(id: Value, error: ResponseError) -> Self {
        Self { jsonrpc: JSONRPC_VERSION, id, result: None, error: Some(error) }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseError {
    pub code: i64,
    pub message: String,
}

pub const ERR_METHOD_NOT_FOUND: i64 = -32601;
pub const ERR_INVALID_PARAMS: i64 = -32602;
pub const ERR_PARSE_ERROR: i64 = -32700;

#[derive(Debug, Clone, Serialize)]
pub struct OutgoingNotification {
    pub jsonrpc: &'static str,
    pub method: &'static str,
    pub params: Value,
}

impl OutgoingNotification {
    pub fn new(method: &'static str, params: Value) -> Self {
        Self { jsonrpc: JSONRPC_VERSION, method, params }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl From<glsl_atom::TextPosition> for Position {
    fn from(p: glsl_atom::TextPosition) -> Self {
        Self { line: p.line, character: p.character }
    }
}

impl From<Position> for glsl_atom::TextPosition {
    fn from(p: Position) -> Self {
        glsl_atom::TextPosition::new(p.line, p.character)
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl From<glsl_atom::TextRange> for Range {
    fn from(r: glsl_atom::TextRange) -> Self {
        Self { start: r.start.into(), end: r.end.into() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextDocumentIdentifier {
    pub uri: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VersionedTextDocumentIdentifier {
    pub uri: String,
    pub version: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextDocumentItem {
    pub uri: String,
    #[serde(default)]
    pub version: i32,
    pub text: String,
}

/// The common `{ textDocument }` shape shared by `documentSymbol`,
/// `foldingRange`, `semanticTokens/full`, and `inlayHint` (the last also
/// carries a `range`, which this server's inlay-hint handler ignores — it
/// always computes hints over the whole document).
#[derive(Debug, Clone, Deserialize)]
pub struct TextDocumentIdentifierParams {
    #[serde(rename = "textDocument")]
    pub text_document: TextDocumentIdentifier,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextDocumentPositionParams {
    #[serde(rename = "textDocument")]
    pub text_document: TextDocumentIdentifier,
    pub position: Position,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DidOpenTextDocumentParams {
    #[serde(rename = "textDocument")]
    pub text_document: TextDocumentItem,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextDocumentContentChangeEvent {
    #[serde(default)]
    pub range: Option<Range>,
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DidChangeTextDocumentParams {
    #[serde(rename = "textDocument")]
    pub text_document: VersionedTextDocumentIdentifier,
    #[serde(rename = "contentChanges")]
    pub content_changes: Vec<TextDocumentContentChangeEvent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DidCloseTextDocumentParams {
    #[serde(rename = "textDocument")]
    pub text_document: TextDocumentIdentifier,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReferenceContext {
    #[serde(default, rename = "includeDeclaration")]
    pub include_declaration: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReferenceParams {
    #[serde(rename = "textDocument")]
    pub text_document: TextDocumentIdentifier,
    pub position: Position,
    #[serde(default)]
    pub context: ReferenceContext,
}

#[derive(Debug, Clone, Serialize)]
pub struct TextEdit {
    pub range: Range,
    #[serde(rename = "newText")]
    pub new_text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompletionItem {
    pub label: String,
    pub kind: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "textEdit")]
    pub text_edit: Option<TextEdit>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompletionList {
    #[serde(rename = "isIncomplete")]
    pub is_incomplete: bool,
    pub items: Vec<CompletionItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Hover {
    pub contents: HoverContents,
}

#[derive(Debug, Clone, Serialize)]
pub struct HoverContents {
    pub kind: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParameterInformation {
    pub label: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignatureInformation {
    pub label: String,
    pub parameters: Vec<ParameterInformation>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignatureHelp {
    pub signatures: Vec<SignatureInformation>,
    #[serde(rename = "activeSignature")]
    pub active_signature: u32,
    #[serde(rename = "activeParameter")]
    pub active_parameter: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Location {
    pub uri: String,
    pub range: Range,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentSymbol {
    pub name: String,
    pub kind: u32,
    pub range: Range,
    #[serde(rename = "selectionRange")]
    pub selection_range: Range,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DocumentSymbol>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FoldingRange {
    #[serde(rename = "startLine")]
    pub start_line: u32,
    #[serde(rename = "endLine")]
    pub end_line: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SemanticTokens {
    pub data: Vec<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InlayHint {
    pub position: Position,
    pub label: String,
    pub kind: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub range: Range,
    pub severity: u32,
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublishDiagnosticsParams {
    pub uri: String,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShowMessageParams {
    #[serde(rename = "type")]
    pub message_type: u32,
    pub message: String,
}

pub const MESSAGE_TYPE_ERROR: u32 = 1;
pub const MESSAGE_TYPE_WARNING: u32 = 2;

pub fn lsp_symbol_kind(kind: glsl_query::SymbolKind) -> u32 {
    use glsl_query::SymbolKind;
    match kind {
        SymbolKind::Variable { .. } => 13,
        SymbolKind::Parameter => 13,
        SymbolKind::StructMember => 8,
        SymbolKind::BlockMember => 8,
        SymbolKind::Swizzle => 8,
        SymbolKind::Type => 23,
        SymbolKind::Function => 12,
        SymbolKind::LayoutQualifierKey => 8,
        SymbolKind::BlockInstance => 13,
        SymbolKind::HeaderName => 19,
        SymbolKind::Macro => 11,
    }
}

pub fn lsp_completion_item_kind(kind: glsl_features::CompletionItemKind) -> u32 {
    use glsl_features::CompletionItemKind;
    match kind {
        CompletionItemKind::Variable => 6,
        CompletionItemKind::Parameter => 6,
        CompletionItemKind::Field => 5,
        CompletionItemKind::Swizzle => 5,
        CompletionItemKind::Method => 2,
        CompletionItemKind::Function => 3,
        CompletionItemKind::Type => 7,
        CompletionItemKind::Keyword => 14,
        CompletionItemKind::Macro => 1,
    }
}

pub fn lsp_inlay_hint_kind(kind: glsl_features::InlayHintKind) -> u32 {
    use glsl_features::InlayHintKind;
    match kind {
        InlayHintKind::Type => 1,
        InlayHintKind::Parameter => 2,
        InlayHintKind::BlockEnd => 2,
    }
}

pub fn lsp_diagnostic_severity(severity: glsl_atom::DiagnosticSeverity) -> u32 {
    use glsl_atom::DiagnosticSeverity;
    match severity {
        DiagnosticSeverity::Hint => 4,
        DiagnosticSeverity::Info => 3,
        DiagnosticSeverity::Warning => 2,
        DiagnosticSeverity::Error | DiagnosticSeverity::Fatal => 1,
    }
}
