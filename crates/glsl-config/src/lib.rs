//! Server configuration (§6 "Recognized configuration options"): the
//! per-feature `enable` gates, the inlay-hint sub-flags, the
//! `languageConfig` shader-version/stage pair, and the logging level.
//!
//! Follows the same shape as the teacher's own config loader: a `ConfigFile`
//! that deserializes tolerantly from TOML (unknown fields ignored, missing
//! sections default), wrapped in a `Config` that also carries whatever
//! derived state doesn't belong in the file itself.

use std::{fs, path::PathBuf};

use glsl_compile::ShaderStage;
use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LoggingLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Critical,
}

impl Default for LoggingLevel {
    fn default() -> Self {
        LoggingLevel::Info
    }
}

impl LoggingLevel {
    /// `tracing` has no `critical` level; it maps onto `Error`, the nearest
    /// level that still surfaces on a default `EnvFilter`.
    pub fn as_tracing_level(self) -> tracing::Level {
        match self {
            LoggingLevel::Trace => tracing::Level::TRACE,
            LoggingLevel::Debug => tracing::Level::DEBUG,
            LoggingLevel::Info => tracing::Level::INFO,
            LoggingLevel::Warn => tracing::Level::WARN,
            LoggingLevel::Error | LoggingLevel::Critical => tracing::Level::ERROR,
        }
    }
}

macro_rules! enable_flag {
    ($name:ident) => {
        #[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
        pub struct $name {
            #[serde(default = "default_true")]
            pub enable: bool,
        }

        impl Default for $name {
            fn default() -> Self {
                Self { enable: true }
            }
        }
    };
}

fn default_true() -> bool {
    true
}

enable_flag!(CompletionConfig);
enable_flag!(HoverConfig);
enable_flag!(SignatureHelpConfig);
enable_flag!(DeclarationConfig);
enable_flag!(DefinitionConfig);
enable_flag!(ReferenceConfig);
enable_flag!(DocumentSymbolConfig);
enable_flag!(SemanticTokenConfig);
enable_flag!(FoldingRangeConfig);
enable_flag!(DiagnosticConfig);

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct InlayHintConfig {
    #[serde(default = "default_true")]
    pub enable: bool,
    #[serde(default = "default_true")]
    pub enable_argument_name_hint: bool,
    #[serde(default = "default_true")]
    pub enable_implicit_cast_hint: bool,
    #[serde(default = "default_true")]
    pub enable_block_end_hint: bool,
    #[serde(default = "InlayHintConfig::default_threshold")]
    pub block_end_hint_line_threshold: u32,
}

impl InlayHintConfig {
    const fn default_threshold() -> u32 {
        5
    }
}

impl Default for InlayHintConfig {
    fn default() -> Self {
        Self {
            enable: true,
            enable_argument_name_hint: true,
            enable_implicit_cast_hint: true,
            enable_block_end_hint: true,
            block_end_hint_line_threshold: Self::default_threshold(),
        }
    }
}

/// `languageConfig.version` / `languageConfig.stage`: which GLSL version and
/// shader stage the preamble and any version-gated diagnostics should target.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct LanguageConfig {
    #[serde(default = "LanguageConfig::default_version")]
    pub version: u32,
    #[serde(default)]
    pub stage: Option<String>,
}

impl LanguageConfig {
    const fn default_version() -> u32 {
        460
    }

    /// Parses `stage` against the fixed set `ShaderStage::parse` recognizes,
    /// logging and falling back to "no stage" (generic preamble) on an
    /// unrecognized spelling rather than failing the whole config load.
    pub fn shader_stage(&self) -> Option<ShaderStage> {
        let raw = self.stage.as_deref()?;
        match ShaderStage::parse(raw) {
            Some(stage) => Some(stage),
            None => {
                warn!(target: "config", stage = raw, "unrecognized languageConfig.stage, ignoring");
                None
            }
        }
    }
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self { version: Self::default_version(), stage: None }
    }
}

/// The full set of `initialize`-time options (§6). Every field defaults when
/// absent from the client-supplied/`on-disk` file, per the tolerant-load
/// policy in §1.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub completion: CompletionConfig,
    #[serde(default)]
    pub hover: HoverConfig,
    #[serde(default, rename = "signatureHelp")]
    pub signature_help: SignatureHelpConfig,
    #[serde(default)]
    pub declaration: DeclarationConfig,
    #[serde(default)]
    pub definition: DefinitionConfig,
    #[serde(default)]
    pub reference: ReferenceConfig,
    #[serde(default, rename = "documentSymbol")]
    pub document_symbol: DocumentSymbolConfig,
    #[serde(default, rename = "semanticToken")]
    pub semantic_token: SemanticTokenConfig,
    #[serde(default, rename = "foldingRange")]
    pub folding_range: FoldingRangeConfig,
    #[serde(default, rename = "inlayHint")]
    pub inlay_hint: InlayHintConfig,
    #[serde(default)]
    pub diagnostic: DiagnosticConfig,
    #[serde(default, rename = "languageConfig")]
    pub language_config: LanguageConfig,
    #[serde(default, rename = "loggingLevel")]
    pub logging_level: LoggingLevel,
}

/// The loaded configuration plus where it came from — handed to every
/// feature handler as the `config` half of `(config, queryInfo, params)`
/// (§4.I).
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>,
    pub file: ConfigFile,
}

impl Config {
    pub fn is_enabled(&self, gate: impl Fn(&ConfigFile) -> bool) -> bool {
        gate(&self.file)
    }
}

/// Best-effort config path: `glsld.toml` in the current working directory
/// first, then the platform config dir, matching the discovery order the
/// teacher's own `core_config::discover` uses for `oxidized.toml`.
pub fn discover() -> PathBuf {
    let local = PathBuf::from("glsld.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("glsld").join("glsld.toml");
    }
    PathBuf::from("glsld.toml")
}

/// Loads the config at `path` (or the discovered default). A missing file
/// is not an error — `Config::default()` is returned. A malformed file logs
/// a warning and also falls back to defaults (§1: the server must start
/// even with a broken config).
pub fn load_from(path: Option<PathBuf>) -> Config {
    let path = path.unwrap_or_else(discover);
    match fs::read_to_string(&path) {
        Ok(content) => match toml::from_str::<ConfigFile>(&content) {
            Ok(file) => Config { raw: Some(content), file },
            Err(err) => {
                warn!(target: "config", path = %path.display(), error = %err, "malformed config, using defaults");
                Config::default()
            }
        },
        Err(_) => Config::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_when_missing_file() {
        let cfg = load_from(Some(PathBuf::from("__nonexistent_glsld_config__.toml")));
        assert!(cfg.file.completion.enable);
        assert_eq!(cfg.file.language_config.version, 460);
        assert_eq!(cfg.file.logging_level, LoggingLevel::Info);
    }

    #[test]
    fn parses_disabled_features_and_stage() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            tmp.path(),
            "[completion]\nenable = false\n[languageConfig]\nversion = 450\nstage = \"fragment\"\n",
        )
        .unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf()));
        assert!(!cfg.file.completion.enable);
        assert!(cfg.file.hover.enable, "unrelated sections keep their defaults");
        assert_eq!(cfg.file.language_config.version, 450);
        assert_eq!(cfg.file.language_config.shader_stage(), Some(ShaderStage::Fragment));
    }

    #[test]
    fn unrecognized_stage_falls_back_to_none_without_failing_load() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "[languageConfig]\nstage = \"nonsense\"\n").unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf()));
        assert_eq!(cfg.file.language_config.shader_stage(), None);
    }

    #[test]
    fn inlay_hint_sub_flags_default_on_with_a_five_line_threshold() {
        let cfg = load_from(Some(PathBuf::from("__nonexistent_inlay__.toml")));
        assert!(cfg.file.inlay_hint.enable_argument_name_hint);
        assert!(cfg.file.inlay_hint.enable_implicit_cast_hint);
        assert!(cfg.file.inlay_hint.enable_block_end_hint);
        assert_eq!(cfg.file.inlay_hint.block_end_hint_line_threshold, 5);
    }

    #[test]
    fn malformed_toml_falls_back_to_defaults_rather_than_failing() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "not = [valid").unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf()));
        assert!(cfg.file.completion.enable);
    }
}
