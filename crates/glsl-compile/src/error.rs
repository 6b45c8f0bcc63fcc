//! The fatal-error class of §7. Anything that reaches a variant here aborts
//! only the one `CompilePreamble`/`CompileMainFile` call that raised it —
//! the driver never panics and never takes the server process down.
//!
//! Everything recoverable (a mistyped identifier, an unresolved overload, a
//! malformed expression) never reaches this type at all; it is recorded as a
//! `DiagnosticMessage` on the `CompilerResult` instead.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("i/o error while resolving include path {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("include not found: {header}")]
    IncludeNotFound { header: String },

    #[error("include cycle detected: {header}")]
    IncludeCycle { header: String },

    #[error("macro expansion exceeded the recursion limit")]
    MacroRecursionLimit,

    #[error("failed to build the system preamble: {0}")]
    PreambleBuildFailed(String),
}

impl CompileError {
    /// Maps one of the preprocessor's own fatal-severity diagnostic codes
    /// (`glsl_pp`'s `"pp-include-not-found"` etc.) onto the matching typed
    /// variant, so a fatal condition discovered mid-preprocessing can be
    /// reported through `Result` instead of being silently swallowed into
    /// the diagnostics list and processed as if recoverable.
    pub(crate) fn from_pp_diagnostic(code: &str, text: &str) -> Option<Self> {
        match code {
            "pp-include-not-found" => Some(Self::IncludeNotFound { header: text.to_string() }),
            "pp-include-cycle" => Some(Self::IncludeCycle { header: text.to_string() }),
            "pp-recursion-limit" => Some(Self::MacroRecursionLimit),
            _ => None,
        }
    }
}
