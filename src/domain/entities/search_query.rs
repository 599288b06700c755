use crate::helper::error_chain_fmt;

/// Length contract shared with the search request schema.
const MAX_QUERY_CHARS: usize = 500;

/// A validated search query: trimmed, non-empty and within the length cap.
#[derive(Debug, Clone)]
pub struct SearchQuery(String);

impl SearchQuery {
    pub fn parse(s: &str) -> Result<SearchQuery, SearchQueryError> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(SearchQueryError::Empty);
        }

        let length = trimmed.chars().count();
        if length > MAX_QUERY_CHARS {
            return Err(SearchQueryError::TooLong(length));
        }

        Ok(Self(trimmed.to_string()))
    }
}

impl AsRef<str> for SearchQuery {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(thiserror::Error)]
pub enum SearchQueryError {
    #[error("A search query cannot be empty or whitespace-only.")]
    Empty,
    #[error("A search query cannot exceed {MAX_QUERY_CHARS} characters: got {0}.")]
    TooLong(usize),
}

impl std::fmt::Debug for SearchQueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
