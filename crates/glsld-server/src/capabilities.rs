//! Capability advertisement (§4.J): computed once from the loaded
//! [`glsl_config::Config`] and returned verbatim from every `initialize`
//! response — each entry present only if its matching feature's `enable`
//! flag is set.

use serde_json::{json, Value};

use glsl_config::Config;
use glsl_features::{SEMANTIC_MODIFIERS, SEMANTIC_TYPES};

pub fn server_capabilities(config: &Config) -> Value {
    let file = &config.file;
    let mut caps = json!({
        "textDocumentSync": {
            "openClose": true,
            "change": 2,
        },
    });
    let obj = caps.as_object_mut().expect("object literal");

    if file.completion.enable {
        obj.insert("completionProvider".into(), json!({ "triggerCharacters": ["."] }));
    }
    if file.hover.enable {
        obj.insert("hoverProvider".into(), json!(true));
    }
    if file.signature_help.enable {
        obj.insert("signatureHelpProvider".into(), json!({ "triggerCharacters": ["(", ","] }));
    }
    if file.declaration.enable {
        obj.insert("declarationProvider".into(), json!(true));
    }
    if file.definition.enable {
        obj.insert("definitionProvider".into(), json!(true));
    }
    if file.reference.enable {
        obj.insert("referencesProvider".into(), json!(true));
    }
    if file.document_symbol.enable {
        obj.insert("documentSymbolProvider".into(), json!(true));
    }
    if file.folding_range.enable {
        obj.insert("foldingRangeProvider".into(), json!(true));
    }
    if file.inlay_hint.enable {
        obj.insert("inlayHintProvider".into(), json!(true));
    }
    if file.semantic_token.enable {
        obj.insert(
            "semanticTokensProvider".into(),
            json!({
                "legend": {
                    "tokenTypes": SEMANTIC_TYPES,
                    "tokenModifiers": SEMANTIC_MODIFIERS,
                },
                "full": true,
            }),
        );
    }

    caps
}
