use crate::helper::error_chain_fmt;

/// Length contract shared with the chat request schema.
const MAX_QUESTION_CHARS: usize = 2000;

/// A validated chat question: trimmed, non-empty and within the length cap.
///
/// Validation happens before any provider or store is called, so a rejected
/// question costs nothing downstream.
#[derive(Debug, Clone)]
pub struct UserQuestion(String);

impl UserQuestion {
    pub fn parse(s: &str) -> Result<UserQuestion, UserQuestionError> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(UserQuestionError::Empty);
        }

        // Counting chars, not bytes: Hebrew text is 2 bytes per letter.
        let length = trimmed.chars().count();
        if length > MAX_QUESTION_CHARS {
            return Err(UserQuestionError::TooLong(length));
        }

        Ok(Self(trimmed.to_string()))
    }
}

impl AsRef<str> for UserQuestion {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserQuestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(thiserror::Error)]
pub enum UserQuestionError {
    #[error("A question cannot be empty or whitespace-only.")]
    Empty,
    #[error("A question cannot exceed {MAX_QUESTION_CHARS} characters: got {0}.")]
    TooLong(usize),
}

impl std::fmt::Debug for UserQuestionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
