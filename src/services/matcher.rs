//! Case-insensitive multi-word name matching

/// Characters treated as word separators in strict mode
pub const SEPARATORS: &str = "`~!@#$%^&*()-_=+[{]}\\|;:'\",<.>/?";

/// A parsed search query.
///
/// A query without words matches every name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    words: Vec<String>,
    strict: bool,
}

impl Query {
    #[must_use]
    pub fn new(text: &str, strict: bool) -> Self {
        Self {
            words: text.to_lowercase().split_whitespace().map(str::to_string).collect(),
            strict,
        }
    }

    #[must_use]
    pub fn words(&self) -> &[String] {
        &self.words
    }

    #[must_use]
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Check whether `name` satisfies every word of the query.
    ///
    /// Non-strict: each word must appear as a substring of the name.
    /// Strict: each word must equal one of the name's tokens.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        let name = name.to_lowercase();

        if self.strict {
            let tokens = tokenize(&name);
            self.words.iter().all(|word| tokens.contains(&word.as_str()))
        } else {
            self.words.iter().all(|word| name.contains(word.as_str()))
        }
    }
}

/// Check `name` against a whitespace-separated `query`.
#[must_use]
pub fn matches(query: &str, name: &str, strict: bool) -> bool {
    Query::new(query, strict).matches(name)
}

fn tokenize(name: &str) -> Vec<&str> {
    name.split(|c: char| c.is_whitespace() || SEPARATORS.contains(c))
        .filter(|token| !token.is_empty())
        .collect()
}
