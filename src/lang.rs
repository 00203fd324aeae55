use std::path::Path;
use tree_sitter::{Language, Parser, Tree};

/// Source languages the scanner understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lang {
    Java,
}

impl Lang {
    #[must_use]
    pub fn from_ext(ext: &str) -> Option<Self> {
        match ext {
            "java" => Some(Self::Java),
            _ => None,
        }
    }

    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|s| s.to_str())
            .and_then(Self::from_ext)
    }

    #[must_use]
    pub fn grammar(self) -> Language {
        match self {
            Self::Java => tree_sitter_java::language(),
        }
    }

    /// Parses `source` with this language's grammar.
    ///
    /// Returns `None` only when the grammar cannot be loaded or the parser
    /// gives up; syntax errors still produce a tree containing `ERROR` nodes.
    #[must_use]
    pub fn parse(self, source: &str) -> Option<Tree> {
        let mut parser = Parser::new();
        parser.set_language(self.grammar()).ok()?;
        parser.parse(source, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_java_by_extension() {
        assert_eq!(Lang::from_path(Path::new("src/Foo.java")), Some(Lang::Java));
        assert_eq!(Lang::from_path(Path::new("src/foo.rs")), None);
        assert_eq!(Lang::from_path(Path::new("Makefile")), None);
    }

    #[test]
    fn parses_minimal_class() {
        let tree = Lang::Java.parse("class Foo {}");
        assert!(tree.is_some_and(|t| !t.root_node().has_error()));
    }
}
