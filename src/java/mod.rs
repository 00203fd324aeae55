//! Java source extraction: declarations, heritage and call sites.

pub mod extract;
pub mod types;

pub use extract::{extract, parse_source, primary_class_name, ParseFailure};
pub use types::{
    ClassDeclaration, CompilationUnit, DeclKind, Invocation, MethodDeclaration, ReferenceKind,
};
