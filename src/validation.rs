//! Player identifier validation shared by the ledger and the console front end.

/// Longest accepted player identifier, in characters.
pub const MAX_PLAYER_ID_LEN: usize = 64;

/// Player identifier validation errors with helpful messages
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum PlayerIdError {
    #[error("Player id is empty")]
    Empty,

    #[error("Player id is too long (maximum {max} characters)")]
    TooLong { max: usize },

    #[error("Player id cannot contain whitespace")]
    Whitespace,

    #[error("Player id contains control characters")]
    ControlCharacters,
}

/// Validate an opaque player identifier (a chat platform user ID or a console name).
///
/// Identifiers become part of ledger keys, so separators are not restricted
/// but whitespace and control characters are rejected.
pub fn validate_player_id(id: &str) -> Result<(), PlayerIdError> {
    if id.is_empty() {
        return Err(PlayerIdError::Empty);
    }
    if id.chars().count() > MAX_PLAYER_ID_LEN {
        return Err(PlayerIdError::TooLong {
            max: MAX_PLAYER_ID_LEN,
        });
    }
    if id.chars().any(char::is_whitespace) {
        return Err(PlayerIdError::Whitespace);
    }
    if id.chars().any(char::is_control) {
        return Err(PlayerIdError::ControlCharacters);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_snowflakes_and_names() {
        assert!(validate_player_id("807465587633553409").is_ok());
        assert!(validate_player_id("alice").is_ok());
        assert!(validate_player_id("player-456").is_ok());
    }

    #[test]
    fn rejects_malformed_ids() {
        assert_eq!(validate_player_id(""), Err(PlayerIdError::Empty));
        assert_eq!(validate_player_id("two words"), Err(PlayerIdError::Whitespace));
        assert_eq!(
            validate_player_id("bell\u{7}"),
            Err(PlayerIdError::ControlCharacters)
        );
        let long = "x".repeat(MAX_PLAYER_ID_LEN + 1);
        assert_eq!(
            validate_player_id(&long),
            Err(PlayerIdError::TooLong { max: MAX_PLAYER_ID_LEN })
        );
    }
}
