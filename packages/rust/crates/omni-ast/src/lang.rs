//! Markup dialects understood by the parser.
//!
//! JSX lives in JavaScript files and TSX in TypeScript files; both are parsed
//! through the matching ast-grep grammar.

use std::path::Path;

use crate::error::MarkupError;
use crate::re_exports::SupportLang;

/// Supported source dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lang {
    /// JavaScript with JSX (`.js`, `.jsx`, `.mjs`, `.cjs`)
    JavaScript,
    /// TypeScript without JSX (`.ts`, `.mts`, `.cts`)
    TypeScript,
    /// TypeScript with JSX (`.tsx`)
    Tsx,
}

impl Lang {
    /// Short name of the dialect.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::JavaScript => "js",
            Self::TypeScript => "ts",
            Self::Tsx => "tsx",
        }
    }

    /// Try to detect the dialect from a file path.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        Self::from_extension(&ext)
    }

    /// Try to detect the dialect from an extension string.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "js" | "jsx" | "mjs" | "cjs" => Some(Self::JavaScript),
            "ts" | "mts" | "cts" => Some(Self::TypeScript),
            "tsx" => Some(Self::Tsx),
            _ => None,
        }
    }

    /// Grammar used to parse this dialect.
    #[must_use]
    pub fn support_lang(&self) -> SupportLang {
        match self {
            Self::JavaScript => SupportLang::JavaScript,
            Self::TypeScript => SupportLang::TypeScript,
            Self::Tsx => SupportLang::Tsx,
        }
    }
}

impl TryFrom<&str> for Lang {
    type Error = MarkupError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "js" | "jsx" | "javascript" => Ok(Self::JavaScript),
            "ts" | "typescript" => Ok(Self::TypeScript),
            "tsx" => Ok(Self::Tsx),
            _ => Err(MarkupError::UnsupportedLanguage(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path() {
        assert_eq!(Lang::from_path(Path::new("src/App.tsx")), Some(Lang::Tsx));
        assert_eq!(Lang::from_path(Path::new("src/App.JSX")), Some(Lang::JavaScript));
        assert_eq!(Lang::from_path(Path::new("src/util.ts")), Some(Lang::TypeScript));
        assert_eq!(Lang::from_path(Path::new("README.md")), None);
    }

    #[test]
    fn test_try_from_rejects_unknown() {
        assert!(Lang::try_from("python").is_err());
        assert_eq!(Lang::try_from("TSX").ok(), Some(Lang::Tsx));
    }
}
