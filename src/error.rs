pub type FlipbookResult<T> = Result<T, FlipbookError>;

#[derive(thiserror::Error, Debug)]
pub enum FlipbookError {
    /// Refused operation, surfaced to the user; no state was changed.
    #[error("warning: {0}")]
    Warning(String),

    #[error("validation error: {0}")]
    Validation(String),

    /// Recoverable I/O failure (project archive, frame files); in-memory
    /// state is left exactly as before the attempt.
    #[error("io error: {0}")]
    Io(String),

    #[error("encode error: {0}")]
    Encode(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FlipbookError {
    pub fn warning(msg: impl Into<String>) -> Self {
        Self::Warning(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Whether this is a user-facing refusal rather than a hard failure.
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::Warning(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(FlipbookError::warning("x").to_string().contains("warning:"));
        assert!(
            FlipbookError::validation("x")
                .to_string()
                .contains("validation error:")
        );
        assert!(FlipbookError::io("x").to_string().contains("io error:"));
        assert!(
            FlipbookError::encode("x")
                .to_string()
                .contains("encode error:")
        );
    }

    #[test]
    fn warning_predicate_matches_only_warnings() {
        assert!(FlipbookError::warning("x").is_warning());
        assert!(!FlipbookError::io("x").is_warning());
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = FlipbookError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
