use crate::error::PatternError;

/// A single piece of a tokenized pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    /// Text that must appear verbatim.
    Literal(String),
    /// `*`: any run of characters within one path segment.
    SegmentWildcard,
    /// `/**`: nothing at all, or a slash followed by anything (including
    /// further slashes).
    AnyDepth,
}

/// A pattern broken into tokens, expressed against the rooted form of a path
/// (`/src/lib.rs` rather than `src/lib.rs`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Glob {
    pub(crate) tokens: Vec<Token>,
}

impl Glob {
    pub(crate) fn parse(pattern: &str) -> Result<Glob, PatternError> {
        if pattern.contains('\0') {
            return Err(PatternError::NullByte);
        }

        let mut glob = Glob { tokens: Vec::new() };

        // A pattern without any slash names a file or directory at any depth,
        // so it's preceded by an optional run of directories. Anything else is
        // anchored at the repository root, with or without a leading slash.
        if !pattern.contains('/') {
            glob.tokens.push(Token::AnyDepth);
            glob.push_literal('/');
        } else if !pattern.starts_with('/') {
            glob.push_literal('/');
        }

        let mut rest = pattern;
        while let Some(c) = rest.chars().next() {
            if let Some(after) = rest.strip_prefix("/**") {
                glob.tokens.push(Token::AnyDepth);
                rest = after;
                continue;
            }
            match c {
                '*' => glob.tokens.push(Token::SegmentWildcard),
                _ => glob.push_literal(c),
            }
            rest = &rest[c.len_utf8()..];
        }

        Ok(glob)
    }

    fn push_literal(&mut self, c: char) {
        match self.tokens.last_mut() {
            Some(Token::Literal(text)) => text.push(c),
            _ => self.tokens.push(Token::Literal(c.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(s: &str) -> Token {
        Token::Literal(s.to_owned())
    }

    #[test]
    fn test_tokenize() {
        use Token::*;

        let examples = vec![
            ("*", vec![AnyDepth, lit("/"), SegmentWildcard]),
            ("*.js", vec![AnyDepth, lit("/"), SegmentWildcard, lit(".js")]),
            ("/src/frontend/", vec![lit("/src/frontend/")]),
            ("docs/*.md", vec![lit("/docs/"), SegmentWildcard, lit(".md")]),
            (
                "/src/components/**/*.jsx",
                vec![
                    lit("/src/components"),
                    AnyDepth,
                    lit("/"),
                    SegmentWildcard,
                    lit(".jsx"),
                ],
            ),
            ("/build/**", vec![lit("/build"), AnyDepth]),
            ("/**/bar", vec![AnyDepth, lit("/bar")]),
            ("/a/**b", vec![lit("/a"), AnyDepth, lit("b")]),
            ("**", vec![AnyDepth, lit("/"), SegmentWildcard, SegmentWildcard]),
        ];

        for (pattern, tokens) in examples {
            assert_eq!(
                Glob::parse(pattern).unwrap().tokens,
                tokens,
                "tokens mismatch for `{}`",
                pattern
            );
        }
    }

    #[test]
    fn test_null_byte() {
        assert_eq!(Glob::parse("f\0oo"), Err(PatternError::NullByte));
    }
}
