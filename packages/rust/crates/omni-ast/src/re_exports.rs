//! Re-exports from ast-grep (Unified ast-grep v0.40.5)
//!
//! This module provides unified access to ast-grep-core and ast-grep-language
//! types, ensuring consistent version usage across the project.

// ============================================================================
// Re-exports (Unified ast-grep version)
// ============================================================================

// Core tree access
pub use ast_grep_core::Doc;
pub use ast_grep_core::Node;
pub use ast_grep_core::tree_sitter::StrDoc;

// Language support
pub use ast_grep_language::LanguageExt;
pub use ast_grep_language::SupportLang;

/// Syntax node of a parsed source string.
pub type SyntaxNode<'r> = Node<'r, StrDoc<SupportLang>>;
