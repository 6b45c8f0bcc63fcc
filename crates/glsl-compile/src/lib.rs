//! The compiler driver (§4.G): wires the atom table, tokenizer,
//! preprocessor, parser, and semantic analyzer into one entry point, caches
//! the system preamble once per process, and yields an immutable
//! [`CompilerResult`].

mod error;
mod invocation;
pub mod preamble;

pub use error::CompileError;
pub use invocation::{CompilerInvocation, CompilerResult, PrecompiledPreamble};
pub use preamble::ShaderStage;
