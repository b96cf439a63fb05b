//! Commit message checks done before anything reaches the repository.

use crate::error::{CoreError, CoreResult};

/// Trims `message` and rejects what the commit path cannot carry.
///
/// Rejected: empty or whitespace-only messages, NUL bytes, double quotes,
/// and control characters other than tab. Newlines count as control
/// characters, so messages are single-line.
///
/// # Errors
///
/// [`CoreError::InvalidCommitMessage`] naming the first problem found.
pub fn validate_commit_message(message: &str) -> CoreResult<String> {
    let trimmed = message.trim();
    if trimmed.is_empty() {
        return Err(CoreError::InvalidCommitMessage("message is empty".into()));
    }
    if trimmed.contains('\0') {
        return Err(CoreError::InvalidCommitMessage("contains a NUL byte".into()));
    }
    if trimmed.contains('"') {
        return Err(CoreError::InvalidCommitMessage("contains a double quote".into()));
    }
    if let Some(c) = trimmed.chars().find(|c| c.is_control() && *c != '\t') {
        return Err(CoreError::InvalidCommitMessage(format!(
            "contains control character U+{:04X}",
            u32::from(c)
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_and_trims() {
        assert_eq!(validate_commit_message("  fix: bug \n").unwrap(), "fix: bug");
    }

    #[test]
    fn tab_is_allowed() {
        assert!(validate_commit_message("a\tb").is_ok());
    }

    #[test]
    fn rejects_empty_and_whitespace() {
        assert!(validate_commit_message("").is_err());
        assert!(validate_commit_message(" \t\n").is_err());
    }

    #[test]
    fn rejects_newline_inside() {
        let err = validate_commit_message("line1\nline2").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid commit message: contains control character U+000A"
        );
    }

    #[test]
    fn rejects_nul_and_quote() {
        assert!(matches!(
            validate_commit_message("a\0b"),
            Err(CoreError::InvalidCommitMessage(m)) if m.contains("NUL")
        ));
        assert!(matches!(
            validate_commit_message("say \"hi\""),
            Err(CoreError::InvalidCommitMessage(m)) if m.contains("double quote")
        ));
    }
}
