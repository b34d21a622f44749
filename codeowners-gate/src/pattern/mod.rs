//! Path patterns.
//!
//! The supported syntax is a small subset of the CODEOWNERS glob grammar:
//!
//! - `*` matches any run of characters within a single path segment.
//! - `/**` matches nothing, or a slash followed by anything (so it spans any
//!   number of directories).
//! - A pattern with no `/` may match at any depth (`*.js` matches
//!   `src/utils/helper.js`). Any other pattern is anchored at the repository
//!   root, whether or not it has a leading `/`.
//! - Everything else is literal. Trailing slashes are kept as-is, so
//!   `/src/frontend/` only matches the path `src/frontend/` itself.
//!
//! Patterns always have to match the whole path.

mod glob;
mod matcher;

use std::{borrow::Cow, fmt, str::FromStr};

use crate::error::PatternError;

use self::{glob::Glob, matcher::Matcher};

/// A compiled pattern from a CODEOWNERS entry.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    matcher: Matcher,
}

impl Pattern {
    pub fn new(source: &str) -> Result<Pattern, PatternError> {
        let glob = Glob::parse(source)?;
        let matcher = Matcher::compile(&glob)?;
        Ok(Pattern {
            source: source.to_owned(),
            matcher,
        })
    }

    /// The pattern as written in the CODEOWNERS file.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.matcher.is_match(&rooted(path))
    }
}

impl FromStr for Pattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pattern::new(s)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Check a single path against a single pattern. A pattern that can't be
/// compiled never matches; a warning is logged instead of failing. Use
/// [`Pattern::new`] to get at the error.
pub fn matches(path: &str, pattern: &str) -> bool {
    match Pattern::new(pattern) {
        Ok(pattern) => pattern.is_match(path),
        Err(err) => {
            log::warn!("ignoring invalid pattern `{}`: {}", pattern.escape_debug(), err);
            false
        }
    }
}

fn rooted(path: &str) -> Cow<'_, str> {
    if path.starts_with('/') {
        Cow::Borrowed(path)
    } else {
        Cow::Owned(format!("/{}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_cases() {
        let examples = [
            ("src/frontend/app.js", "/src/frontend/", false),
            ("src/backend/server.js", "/src/frontend/", false),
            ("src/security/auth.js", "/src/security/", false),
            ("config.js", "*.js", true),
            ("src/utils/helper.js", "*.js", true),
            ("src/utils/helper.ts", "*.js", false),
            ("README.md", "*", true),
            ("src/components/Button.jsx", "/src/components/**/*.jsx", true),
        ];

        for (path, pattern, expected) in examples {
            assert_eq!(
                matches(path, pattern),
                expected,
                "expected `{}` vs `{}` to be {}",
                path,
                pattern,
                expected
            );
        }
    }

    #[test]
    fn test_literals() {
        assert!(matches("src/parser/mod.rs", "/src/parser/mod.rs"));
        assert!(matches("src/parser/mod.rs", "src/parser/mod.rs"));
        assert!(matches("src/parser/mod.rs", "mod.rs"));
        assert!(matches("lib/parser/mod.rs", "mod.rs"));
        assert!(!matches("lib/parser/mod.rs", "/mod.rs"));
        assert!(!matches("src/parser/mod.go", "mod.rs"));
        assert!(!matches("src/parser/mod.rs", "src/parser"));
        assert!(!matches("src/parser/modXrs", "mod.rs"));
    }

    #[test]
    fn test_anchoring() {
        assert!(matches("script/foo", "/script/foo"));
        assert!(matches("script/foo", "script/foo"));
        assert!(!matches("bar/script/foo", "/script/foo"));
        assert!(!matches("bar/script/foo", "script/foo"));
        assert!(matches("bar/script/foo", "foo"));
    }

    #[test]
    fn test_wildcards() {
        assert!(matches("src/parser/mod.rs", "src/*/mod.rs"));
        assert!(matches("src/lexer/mod.rs", "src/*/mod.rs"));
        assert!(!matches("src/a/b/mod.rs", "src/*/mod.rs"));
        assert!(matches("src/parser/parser.rs", "src/parser/*"));
        assert!(!matches("src/parser/sub/thing.rs", "src/parser/*"));
        assert!(matches("src/p/lib.go", "/src/p*/*.*"));
        assert!(!matches("src/parser/README", "/src/p*/*.*"));
        assert!(matches("Makefile", "Make*"));
        assert!(matches("build/Makefile.am", "Make*"));
    }

    #[test]
    fn test_double_stars() {
        assert!(matches("foo/qux", "/foo/**/qux"));
        assert!(matches("foo/bar/qux", "/foo/**/qux"));
        assert!(matches("foo/bar/baz/qux", "/foo/**/qux"));
        assert!(!matches("foo/bar", "/foo/**/qux"));
        assert!(!matches("bar/qux", "/foo/**/qux"));

        assert!(matches("build", "/build/**"));
        assert!(matches("build/out/app", "/build/**"));
        assert!(!matches("builder/app", "/build/**"));

        assert!(matches("baz", "/**/baz"));
        assert!(matches("x/y/baz", "/**/baz"));
    }

    #[test]
    fn test_rooted_paths() {
        assert!(matches("/src/frontend/", "/src/frontend/"));
        assert!(matches("src/frontend/", "/src/frontend/"));
        assert!(matches("/config.js", "*.js"));
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(!matches("f\0oo", "f\0oo"));
        assert_eq!(Pattern::new("f\0oo").unwrap_err(), PatternError::NullByte);
    }

    #[test]
    fn test_display() {
        let pattern: Pattern = "/docs/**".parse().unwrap();
        assert_eq!(pattern.to_string(), "/docs/**");
        assert_eq!(pattern.as_str(), "/docs/**");
    }
}
