//! `glsld` entrypoint (§1 AMBIENT, §2.K): parses CLI arguments, wires up
//! file-backed logging and a panic hook exactly as `ox-bin` does, loads the
//! configuration file, then hands real `stdio` to `glsld_server::run`.

use std::path::{Path, PathBuf};
use std::sync::Once;

use anyhow::Result;
use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "glsld", version, about = "GLSL language server")]
struct Args {
    /// Optional path to the configuration file (overrides discovery of
    /// `glsld.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
}

/// Configures a non-blocking, file-backed `tracing` subscriber. `stdout` is
/// the JSON-RPC channel, so logs can never go there; everything lands in
/// `glsld.log` in the working directory instead.
fn configure_logging(level: tracing::Level) -> Option<WorkerGuard> {
    let log_dir = Path::new(".");
    let log_path = log_dir.join("glsld.log");
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }

    let file_appender = tracing_appender::rolling::never(log_dir, "glsld.log");
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    match tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(nb_writer)
        .try_init()
    {
        Ok(_) => Some(guard),
        Err(_err) => None,
    }
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = glsl_config::load_from(args.config.clone());

    let _log_guard = configure_logging(config.file.logging_level.as_tracing_level());
    install_panic_hook();

    tracing::info!(
        target: "runtime",
        config_override = args.config.is_some(),
        "startup"
    );

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    glsld_server::run(stdin.lock(), stdout.lock(), config);

    tracing::info!(target: "runtime", "shutdown");
    Ok(())
}
