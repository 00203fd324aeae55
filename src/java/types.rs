//! Declarations extracted from one Java compilation unit.

use serde::{Deserialize, Serialize};

/// How a declaration refers to another class.
///
/// These are textual heuristics: names are compared without type
/// resolution, so shadowed names over-approximate and instance calls
/// through fields or locals under-approximate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    /// The file imports the class (attributed to the file's first class).
    Import,
    /// `extends Target`.
    Extends,
    /// `implements Target`, or an interface extending `Target`.
    Implements,
    /// `Target.method(...)` with `Target` as the textual receiver.
    MethodCall,
    /// `new Target(...)`.
    Instantiation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclKind {
    Class,
    Interface,
    Enum,
    Record,
}

/// A method invocation as written in source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invocation {
    /// Receiver text (`Foo` in `Foo.bar()`), absent for unqualified calls.
    pub qualifier: Option<String>,
    pub method: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MethodDeclaration {
    pub name: String,
    pub has_body: bool,
    pub invocations: Vec<Invocation>,
    /// Simple type names constructed with `new`.
    pub creations: Vec<String>,
}

impl MethodDeclaration {
    /// True if any invocation in the body uses `name` as its receiver.
    #[must_use]
    pub fn calls_on(&self, name: &str) -> bool {
        self.invocations
            .iter()
            .any(|i| i.qualifier.as_deref() == Some(name))
    }

    #[must_use]
    pub fn creates(&self, name: &str) -> bool {
        self.creations.iter().any(|c| c == name)
    }
}

/// A class, interface or enum declaration, identified by simple name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDeclaration {
    pub name: String,
    pub kind: DeclKind,
    /// 1-based line of the declaration.
    pub line: usize,
    pub extends: Option<String>,
    pub implements: Vec<String>,
    pub methods: Vec<MethodDeclaration>,
}

impl ClassDeclaration {
    /// Direct references from this declaration's own syntax to `target`.
    ///
    /// Imports are a property of the file, see
    /// [`CompilationUnit::references_to`].
    #[must_use]
    pub fn direct_references(&self, target: &str) -> Vec<ReferenceKind> {
        let mut kinds = Vec::new();
        if self.extends.as_deref() == Some(target) {
            kinds.push(ReferenceKind::Extends);
        }
        if self.implements.iter().any(|i| i == target) {
            kinds.push(ReferenceKind::Implements);
        }
        if self.methods.iter().any(|m| m.calls_on(target)) {
            kinds.push(ReferenceKind::MethodCall);
        }
        if self.methods.iter().any(|m| m.creates(target)) {
            kinds.push(ReferenceKind::Instantiation);
        }
        kinds
    }

    /// Every name this declaration points at, with the kind of reference.
    ///
    /// Receivers are reported verbatim, so `this.items` or `list` show up
    /// here too; callers keep whatever matches a name they care about.
    #[must_use]
    pub fn outgoing(&self) -> Vec<(String, ReferenceKind)> {
        let mut out = Vec::new();
        if let Some(base) = &self.extends {
            out.push((base.clone(), ReferenceKind::Extends));
        }
        for iface in &self.implements {
            out.push((iface.clone(), ReferenceKind::Implements));
        }
        for method in &self.methods {
            for call in &method.invocations {
                if let Some(q) = &call.qualifier {
                    out.push((q.clone(), ReferenceKind::MethodCall));
                }
            }
            for created in &method.creations {
                out.push((created.clone(), ReferenceKind::Instantiation));
            }
        }
        out
    }
}

/// Everything extracted from one source file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CompilationUnit {
    /// Imported paths as written (`java.util.List`, `com.acme.*`).
    pub imports: Vec<String>,
    /// Declarations in source order, outer before nested.
    pub classes: Vec<ClassDeclaration>,
}

impl CompilationUnit {
    /// The first declared type, which names the file's primary class.
    #[must_use]
    pub fn primary_class(&self) -> Option<&ClassDeclaration> {
        self.classes.first()
    }

    /// Last segment of each single-type import.
    pub fn imported_names(&self) -> impl Iterator<Item = &str> {
        self.imports
            .iter()
            .filter_map(|p| p.rsplit('.').next())
            .filter(|tail| *tail != "*")
    }

    #[must_use]
    pub fn imports_name(&self, name: &str) -> bool {
        self.imported_names().any(|n| n == name)
    }

    /// Kinds of reference each declaration makes to `target`.
    ///
    /// An import of `target` counts against the primary class only. The
    /// declaration of `target` itself is never reported.
    #[must_use]
    pub fn references_to(&self, target: &str) -> Vec<(&ClassDeclaration, Vec<ReferenceKind>)> {
        let imported = self.imports_name(target);
        self.classes
            .iter()
            .enumerate()
            .filter(|(_, class)| class.name != target)
            .filter_map(|(idx, class)| {
                let mut kinds = class.direct_references(target);
                if imported && idx == 0 {
                    kinds.insert(0, ReferenceKind::Import);
                }
                (!kinds.is_empty()).then_some((class, kinds))
            })
            .collect()
    }

    /// Declarations that reference `target` in any way.
    #[must_use]
    pub fn referencing(&self, target: &str) -> Vec<&ClassDeclaration> {
        self.references_to(target)
            .into_iter()
            .map(|(class, _)| class)
            .collect()
    }
}
