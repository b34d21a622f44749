use super::glob::{Glob, Token};
use crate::error::PatternError;

/// A compiled pattern. Common shapes get a cheap string comparison; anything
/// else is compiled to an anchored regular expression.
#[derive(Debug, Clone)]
pub(crate) enum Matcher {
    /// `*`: every path.
    Everything,
    /// No wildcards at all; compared against the rooted path.
    Literal(String),
    /// `*<suffix>` with no slashes, e.g. `*.js`: the file name's suffix.
    BasenameSuffix(String),
    Regex(regex::Regex),
}

impl Matcher {
    pub(crate) fn compile(glob: &Glob) -> Result<Self, PatternError> {
        use Token::*;

        match glob.tokens.as_slice() {
            [AnyDepth, Literal(sep), SegmentWildcard] if sep == "/" => Ok(Self::Everything),
            [AnyDepth, Literal(sep), SegmentWildcard, Literal(suffix)]
                if sep == "/" && !suffix.contains('/') =>
            {
                Ok(Self::BasenameSuffix(suffix.clone()))
            }
            [Literal(text)] => Ok(Self::Literal(text.clone())),
            tokens => glob_to_regex(tokens).map(Self::Regex),
        }
    }

    /// `rooted_path` must start with a slash.
    pub(crate) fn is_match(&self, rooted_path: &str) -> bool {
        match self {
            Self::Everything => true,
            Self::Literal(text) => rooted_path == text,
            Self::BasenameSuffix(suffix) => basename(rooted_path).ends_with(suffix.as_str()),
            Self::Regex(re) => re.is_match(rooted_path),
        }
    }
}

fn basename(path: &str) -> &str {
    match memchr::memrchr(b'/', path.as_bytes()) {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

fn glob_to_regex(tokens: &[Token]) -> Result<regex::Regex, PatternError> {
    let mut regex = String::with_capacity(tokens.len() * 8 + 4);
    regex.push_str(r#"\A"#);
    for token in tokens {
        match token {
            Token::Literal(text) => {
                for c in text.chars() {
                    if regex_syntax::is_meta_character(c) {
                        regex.push('\\');
                    }
                    regex.push(c);
                }
            }
            Token::SegmentWildcard => regex.push_str(r#"[^/]*"#),
            Token::AnyDepth => regex.push_str(r#"(?:/.*)?"#),
        }
    }
    regex.push_str(r#"\z"#);

    regex::Regex::new(&regex).map_err(|err| PatternError::Regex {
        expr: regex,
        message: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(pattern: &str) -> Matcher {
        Matcher::compile(&Glob::parse(pattern).unwrap()).unwrap()
    }

    #[test]
    fn test_fast_paths() {
        assert!(matches!(compile("*"), Matcher::Everything));
        assert!(matches!(compile("*.js"), Matcher::BasenameSuffix(s) if s == ".js"));
        assert!(matches!(compile("/src/frontend/"), Matcher::Literal(s) if s == "/src/frontend/"));
        assert!(matches!(compile("src/main.rs"), Matcher::Literal(s) if s == "/src/main.rs"));
        assert!(matches!(compile("docs/*.md"), Matcher::Regex(_)));
        assert!(matches!(compile("foo*bar"), Matcher::Regex(_)));
    }

    #[test]
    fn test_regex_escaping() {
        let Matcher::Regex(re) = compile("/src/(a)+/*.[ch]") else {
            panic!("expected a regex matcher");
        };
        assert_eq!(re.as_str(), r#"\A/src/\(a\)\+/[^/]*\.\[ch\]\z"#);
        assert!(re.is_match("/src/(a)+/x.[ch]"));
        assert!(!re.is_match("/src/aa/x.c"));
    }

    #[test]
    fn test_oversized_pattern() {
        let pattern = format!("/{}", "a*".repeat(200_000));
        let err = Matcher::compile(&Glob::parse(&pattern).unwrap()).unwrap_err();
        let PatternError::Regex { expr, .. } = &err else {
            panic!("expected a regex error, got {:?}", err);
        };
        assert!(expr.len() > pattern.len());

        let message = err.to_string();
        assert!(message.starts_with("pattern does not compile: "));
        assert!(message.len() < 200, "message too long: {} bytes", message.len());
    }

    #[test]
    fn test_basename() {
        assert_eq!(basename("/a/b/c.rs"), "c.rs");
        assert_eq!(basename("/c.rs"), "c.rs");
        assert_eq!(basename("/a/"), "");
        assert_eq!(basename("c.rs"), "c.rs");
    }
}
