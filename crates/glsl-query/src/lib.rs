//! Read-mostly query index over a finished [`glsl_compile::CompilerResult`]
//! (§4.H): token/range lookup, position containment, and the `AstVisitor`
//! traversal skeleton every feature handler in `glsl-features` prunes with.

mod query_info;
mod symbol;
#[cfg(test)]
mod tests;
mod visitor;

pub use query_info::LanguageQueryInfo;
pub use symbol::{query_symbol_by_position, QueriedSymbol, SymbolKind};
pub use visitor::{traverse_node_contains, AstVisitor, VisitPolicy};
