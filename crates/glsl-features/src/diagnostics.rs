//! Diagnostics (§4.I): the compiler already did the work (§4.D/§4.E/§4.F
//! each push into [`glsl_compile::CompilerResult::diagnostics`] as they run)
//! — this handler is just the `textDocument/publishDiagnostics` gate.

use glsl_atom::DiagnosticMessage;
use glsl_compile::CompilerResult;
use glsl_config::Config;

pub fn diagnostics(result: &CompilerResult, config: &Config) -> Vec<DiagnosticMessage> {
    if !config.file.diagnostic.enable {
        return Vec::new();
    }
    result.diagnostics.clone()
}
