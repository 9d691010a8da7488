use crate::catalog::Song;
use regex::Regex;
use std::sync::LazyLock;

static TOKEN_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[,\s]+").expect("token separator pattern is valid"));

/// Free-text search split into lowercase tokens.
///
/// A song matches when every token is a substring of at least one of its
/// movie, title, composer, singer or lyricist fields (case-insensitive).
/// No tokens means everything matches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    tokens: Vec<String>,
}

impl SearchQuery {
    pub fn parse(raw: &str) -> Self {
        let tokens = TOKEN_SEPARATOR
            .split(raw)
            .filter(|token| !token.is_empty())
            .map(str::to_lowercase)
            .collect();
        Self { tokens }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn matches(&self, song: &Song) -> bool {
        if self.tokens.is_empty() {
            return true;
        }
        let fields = song.search_fields().map(str::to_lowercase);
        self.tokens
            .iter()
            .all(|token| fields.iter().any(|field| field.contains(token.as_str())))
    }
}
