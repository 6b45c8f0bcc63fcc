//! Reconstructs a single-line declaration source form for hover and
//! signature help (§4.I). Comments are not attached: the tokenizer discards
//! trivia entirely (`glsl-lex` has no comment `TokenKind`), so there is no
//! comment run left by the time a `CompilerResult` exists to attach one
//! from.

use glsl_atom::{Atom, AtomTable};
use glsl_syntax::{Arena, AstNode, Declarator, ScalarKind, TypeDesc, TypeId, TypeQualifierSeqNode, TypeSpecifierKind, TypeTable};

pub fn render_qualifiers(arena: &Arena, qualifiers: Option<glsl_syntax::NodeId>) -> String {
    let Some(id) = qualifiers else { return String::new() };
    let AstNode::TypeQualifierSeq(TypeQualifierSeqNode { keywords, .. }) = arena.get(id) else {
        return String::new();
    };
    let mut out = String::new();
    for kw in keywords {
        out.push_str(kw.text());
        out.push(' ');
    }
    out
}

fn array_suffix(arena: &Arena, array: Option<glsl_syntax::NodeId>) -> String {
    let Some(id) = array else { return String::new() };
    match arena.get(id) {
        AstNode::ArraySpec(spec) => "[]".repeat(spec.dims.len().max(1)),
        _ => String::new(),
    }
}

/// The bare type text for a `QualTypeNode`, e.g. `"const vec3"`, `"S"`.
pub fn render_qual_type(atoms: &AtomTable, arena: &Arena, id: glsl_syntax::NodeId) -> String {
    let AstNode::QualType(q) = arena.get(id) else { return String::new() };
    let mut out = render_qualifiers(arena, q.qualifiers);
    match q.specifier {
        TypeSpecifierKind::Builtin(kw) => out.push_str(kw.text()),
        TypeSpecifierKind::Named(name) => out.push_str(atoms.resolve(name)),
        TypeSpecifierKind::InlineStruct(_) => out.push_str("struct"),
    }
    out.push_str(&array_suffix(arena, q.array));
    out
}

fn render_declarator(atoms: &AtomTable, arena: &Arena, d: &Declarator) -> String {
    format!("{}{}", atoms.resolve(d.name), array_suffix(arena, d.array))
}

/// One "as if you'd hand-typed this" line for a declaration node (§4.I
/// hover). `index` selects which declarator of a multi-declarator
/// `Variable`/`Param` decl to render (ignored for `Function`/`Struct`/
/// `InterfaceBlock`, which only ever have one name).
pub fn render_decl(atoms: &AtomTable, arena: &Arena, decl: glsl_syntax::NodeId, index: u32) -> String {
    let AstNode::Decl(d) = arena.get(decl) else { return String::new() };
    match &d.kind {
        glsl_syntax::DeclKind::Variable { qualifiers, ty, declarators } => {
            let decl = declarators.get(index as usize).or_else(|| declarators.first());
            let Some(decl) = decl else { return String::new() };
            format!(
                "{}{} {}",
                render_qualifiers(arena, *qualifiers),
                render_qual_type(atoms, arena, *ty),
                render_declarator(atoms, arena, decl)
            )
        }
        glsl_syntax::DeclKind::Param { qualifiers, ty, declarator } => {
            let name = declarator
                .as_ref()
                .map(|d| render_declarator(atoms, arena, d))
                .unwrap_or_default();
            format!("{}{} {}", render_qualifiers(arena, *qualifiers), render_qual_type(atoms, arena, *ty), name)
                .trim_end()
                .to_string()
        }
        glsl_syntax::DeclKind::Function { qualifiers, return_type, name, params, .. } => {
            let param_list = params
                .iter()
                .map(|p| render_decl(atoms, arena, *p, 0))
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "{}{} {}({})",
                render_qualifiers(arena, *qualifiers),
                render_qual_type(atoms, arena, *return_type),
                atoms.resolve(*name),
                param_list
            )
        }
        glsl_syntax::DeclKind::Struct { name, .. } => {
            format!("struct {}", name.map(|n| atoms.resolve(n).to_string()).unwrap_or_default())
        }
        glsl_syntax::DeclKind::InterfaceBlock { qualifiers, block_name, .. } => {
            format!("{}{} {{ ... }}", render_qualifiers(arena, Some(*qualifiers)), atoms.resolve(*block_name))
        }
        glsl_syntax::DeclKind::Precision { precision, ty } => {
            format!("precision {} {}", precision.text(), render_qual_type(atoms, arena, *ty))
        }
        glsl_syntax::DeclKind::Error => String::new(),
    }
}

/// Parameter labels for signature help, one per formal parameter.
pub fn render_params(atoms: &AtomTable, arena: &Arena, params: &[glsl_syntax::NodeId]) -> Vec<String> {
    params.iter().map(|p| render_decl(atoms, arena, *p, 0)).collect()
}

pub fn atom_text(atoms: &AtomTable, atom: Atom) -> String {
    atoms.resolve(atom).to_string()
}

fn scalar_prefix(kind: ScalarKind) -> &'static str {
    match kind {
        ScalarKind::Bool => "b",
        ScalarKind::Int => "i",
        ScalarKind::Uint => "u",
        ScalarKind::Float => "",
        ScalarKind::Double => "d",
    }
}

fn scalar_name(kind: ScalarKind) -> &'static str {
    match kind {
        ScalarKind::Bool => "bool",
        ScalarKind::Int => "int",
        ScalarKind::Uint => "uint",
        ScalarKind::Float => "float",
        ScalarKind::Double => "double",
    }
}

/// The display spelling for an interned type shape — the inverse of
/// `TypeTable::for_builtin_keyword` for the shapes it can produce, plus the
/// struct/array cases it can't. `arena` resolves a `Struct` shape's name
/// back from its declaring node; `TypeDesc` itself only keeps the `NodeId`.
pub fn render_type_desc(types: &TypeTable, atoms: &AtomTable, arena: &Arena, id: TypeId) -> String {
    match types.resolve(id) {
        TypeDesc::Error => "<error>".to_string(),
        TypeDesc::Void => "void".to_string(),
        TypeDesc::Scalar(k) => scalar_name(*k).to_string(),
        TypeDesc::Vector(k, n) => {
            if matches!(k, ScalarKind::Double) {
                format!("dvec{n}")
            } else {
                format!("{}vec{n}", scalar_prefix(*k))
            }
        }
        TypeDesc::Matrix(k, rows, cols) => {
            let prefix = if matches!(k, ScalarKind::Double) { "d" } else { "" };
            if rows == cols {
                format!("{prefix}mat{rows}")
            } else {
                format!("{prefix}mat{rows}x{cols}")
            }
        }
        TypeDesc::Opaque(kw) => kw.text().to_string(),
        TypeDesc::Array { elem, size } => {
            let elem_name = render_type_desc(types, atoms, arena, *elem);
            match size {
                Some(n) => format!("{elem_name}[{n}]"),
                None => format!("{elem_name}[]"),
            }
        }
        TypeDesc::Struct { decl, .. } => match arena.get(*decl) {
            AstNode::Decl(d) => match &d.kind {
                glsl_syntax::DeclKind::Struct { name: Some(n), .. } => atoms.resolve(*n).to_string(),
                glsl_syntax::DeclKind::InterfaceBlock { block_name, .. } => atoms.resolve(*block_name).to_string(),
                _ => "struct".to_string(),
            },
            _ => "struct".to_string(),
        },
    }
}
