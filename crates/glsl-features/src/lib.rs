//! Feature handlers (§4.I): the per-capability logic that turns a finished
//! [`glsl_compile::CompilerResult`] plus a cursor position into the domain
//! shape an LSP response wants. Deliberately ignorant of `lsp-types`/JSON —
//! `glsld-server`'s transport layer maps these into wire types, the way the
//! teacher keeps its action dispatcher ignorant of terminal escape codes.

mod context;
mod definition;
mod diagnostics;
mod document_symbol;
mod folding_range;
mod hover;
mod inlay_hints;
mod printer;
mod references;
mod semantic_tokens;
mod signature_help;

pub mod completion;

use glsl_atom::TextRange;

pub use definition::definition;
pub use diagnostics::diagnostics;
pub use document_symbol::{document_symbols, DocumentSymbol};
pub use folding_range::{folding_ranges, FoldingRange};
pub use hover::{hover, Hover};
pub use inlay_hints::{inlay_hints, InlayHint, InlayHintKind};
pub use references::references;
pub use semantic_tokens::{encode_deltas, semantic_tokens, SemanticToken, SEMANTIC_MODIFIERS, SEMANTIC_TYPES};
pub use signature_help::{signature_help, ParameterInformation, SignatureHelp, SignatureInformation};

pub use completion::{completion, CompletionItem, CompletionItemKind, CompletionList};

/// A single-file text edit, the same shape in every handler that proposes
/// one (completion, and nowhere else yet).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub range: TextRange,
    pub new_text: String,
}
