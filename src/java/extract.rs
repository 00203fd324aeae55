// src/java/extract.rs
use std::fs;
use std::path::Path;

use thiserror::Error;
use tree_sitter::Node;

use super::types::{
    ClassDeclaration, CompilationUnit, DeclKind, Invocation, MethodDeclaration,
};
use crate::lang::Lang;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseFailure {
    #[error("Java grammar could not be loaded")]
    GrammarUnavailable,
    #[error("syntax error at line {line}, column {column}")]
    Syntax { line: usize, column: usize },
}

/// Parses a compilation unit, failing on any syntax error.
///
/// # Errors
/// Returns `ParseFailure::Syntax` with the first error position if the
/// tree contains `ERROR` or missing nodes.
pub fn parse_source(content: &str) -> Result<CompilationUnit, ParseFailure> {
    let tree = Lang::Java
        .parse(content)
        .ok_or(ParseFailure::GrammarUnavailable)?;
    let root = tree.root_node();

    if root.has_error() {
        let (line, column) = first_error(root).unwrap_or((1, 1));
        return Err(ParseFailure::Syntax { line, column });
    }

    let src = content.as_bytes();
    let mut unit = CompilationUnit::default();
    let mut cursor = root.walk();
    for child in root.named_children(&mut cursor) {
        if child.kind() == "import_declaration" {
            if let Some(path) = import_path(child, src) {
                unit.imports.push(path);
            }
        }
    }
    visit(root, src, &mut unit.classes);
    Ok(unit)
}

/// Lenient extraction used by project scans: failures are logged and yield
/// an empty unit so that one bad file never stops a scan.
#[must_use]
pub fn extract(path: &Path, content: &str) -> CompilationUnit {
    match parse_source(content) {
        Ok(unit) => unit,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "skipping unparseable source");
            CompilationUnit::default()
        }
    }
}

/// Name of the first type declared in the file at `path`.
#[must_use]
pub fn primary_class_name(path: &Path) -> Option<String> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "cannot read source");
            return None;
        }
    };
    extract(path, &content).primary_class().map(|c| c.name.clone())
}

fn first_error(node: Node) -> Option<(usize, usize)> {
    if node.is_error() || node.is_missing() {
        let p = node.start_position();
        return Some((p.row + 1, p.column + 1));
    }
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}

fn text<'a>(node: Node, src: &'a [u8]) -> &'a str {
    node.utf8_text(src).unwrap_or("")
}

fn import_path(node: Node, src: &[u8]) -> Option<String> {
    let raw = text(node, src).trim();
    let body = raw.strip_prefix("import")?.trim_end_matches(';').trim();
    let body = body.strip_prefix("static").map_or(body, str::trim);
    let path: String = body.chars().filter(|c| !c.is_whitespace()).collect();
    (!path.is_empty()).then_some(path)
}

fn decl_kind(kind: &str) -> Option<DeclKind> {
    match kind {
        "class_declaration" => Some(DeclKind::Class),
        "interface_declaration" => Some(DeclKind::Interface),
        "enum_declaration" => Some(DeclKind::Enum),
        "record_declaration" => Some(DeclKind::Record),
        _ => None,
    }
}

fn visit(node: Node, src: &[u8], out: &mut Vec<ClassDeclaration>) {
    if let Some(kind) = decl_kind(node.kind()) {
        if let Some(decl) = header(node, kind, src) {
            let idx = out.len();
            out.push(decl);
            if let Some(body) = node.child_by_field_name("body") {
                visit_members(body, idx, src, out);
            }
            return;
        }
    }

    let mut cursor = node.walk();
    let children: Vec<Node> = node.named_children(&mut cursor).collect();
    for child in children {
        visit(child, src, out);
    }
}

fn visit_members(body: Node, owner: usize, src: &[u8], out: &mut Vec<ClassDeclaration>) {
    let mut cursor = body.walk();
    let members: Vec<Node> = body.named_children(&mut cursor).collect();
    for member in members {
        match member.kind() {
            "method_declaration" | "constructor_declaration" => {
                let method = method(member, src);
                if let Some(decl) = out.get_mut(owner) {
                    decl.methods.push(method);
                }
            }
            "enum_body_declarations" => visit_members(member, owner, src, out),
            _ => visit(member, src, out),
        }
    }
}

fn header(node: Node, kind: DeclKind, src: &[u8]) -> Option<ClassDeclaration> {
    let name = text(node.child_by_field_name("name")?, src).to_string();
    let extends = child_of_kind(node, "superclass")
        .and_then(|s| s.named_child(0))
        .map(|t| simple_type_name(t, src));

    let implements = ["super_interfaces", "extends_interfaces"]
        .iter()
        .filter_map(|k| child_of_kind(node, k))
        .flat_map(|n| type_list(n, src))
        .collect();

    Some(ClassDeclaration {
        name,
        kind,
        line: node.start_position().row + 1,
        extends,
        implements,
        methods: Vec::new(),
    })
}

fn child_of_kind<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find(|c| c.kind() == kind);
    found
}

/// Type names under a `super_interfaces` / `extends_interfaces` node.
fn type_list(node: Node, src: &[u8]) -> Vec<String> {
    let Some(list) = child_of_kind(node, "type_list") else {
        return Vec::new();
    };
    let mut cursor = list.walk();
    let names = list
        .named_children(&mut cursor)
        .map(|t| simple_type_name(t, src))
        .collect();
    names
}

/// Reduces `a.b.Foo<T>` style type syntax to `Foo`.
fn simple_type_name(node: Node, src: &[u8]) -> String {
    match node.kind() {
        "type_identifier" | "identifier" => text(node, src).to_string(),
        "generic_type" | "annotated_type" | "scoped_type_identifier" => {
            let last_type = if node.kind() == "generic_type" {
                node.named_child(0)
            } else {
                let count = node.named_child_count();
                count.checked_sub(1).and_then(|i| node.named_child(i))
            };
            last_type.map_or_else(|| fallback_name(text(node, src)), |t| simple_type_name(t, src))
        }
        _ => fallback_name(text(node, src)),
    }
}

fn fallback_name(raw: &str) -> String {
    let without_generics = raw.split('<').next().unwrap_or(raw);
    without_generics
        .rsplit('.')
        .next()
        .unwrap_or(without_generics)
        .trim()
        .to_string()
}

fn method(node: Node, src: &[u8]) -> MethodDeclaration {
    let name = node
        .child_by_field_name("name")
        .map(|n| text(n, src).to_string())
        .unwrap_or_default();
    let body = node.child_by_field_name("body");

    let mut decl = MethodDeclaration {
        name,
        has_body: body.is_some(),
        ..MethodDeclaration::default()
    };
    if let Some(body) = body {
        collect_calls(body, src, &mut decl);
    }
    decl
}

fn collect_calls(node: Node, src: &[u8], decl: &mut MethodDeclaration) {
    match node.kind() {
        "method_invocation" => {
            let method = node
                .child_by_field_name("name")
                .map(|n| text(n, src).to_string())
                .unwrap_or_default();
            let qualifier = node
                .child_by_field_name("object")
                .map(|n| text(n, src).to_string());
            decl.invocations.push(Invocation { qualifier, method });
        }
        "object_creation_expression" => {
            if let Some(ty) = node.child_by_field_name("type") {
                decl.creations.push(simple_type_name(ty, src));
            }
        }
        _ => {}
    }

    let mut cursor = node.walk();
    let children: Vec<Node> = node.named_children(&mut cursor).collect();
    for child in children {
        collect_calls(child, src, decl);
    }
}
