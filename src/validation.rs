//! Input validation for player names, passwords and save-slot names

use std::collections::HashSet;

/// Username validation errors with helpful messages
#[derive(Debug, thiserror::Error)]
pub enum UsernameError {
    #[error("Username is too short (minimum {min} characters)")]
    TooShort { min: usize },

    #[error("Username is too long (maximum {max} characters)")]
    TooLong { max: usize },

    #[error("Username cannot start or end with whitespace")]
    InvalidWhitespace,

    #[error("Username contains invalid characters: {chars}")]
    InvalidCharacters { chars: String },

    #[error("Username contains path separators (/ or \\)")]
    PathTraversal,

    #[error("Username contains filesystem reserved characters")]
    FilesystemReserved,

    #[error("Username is a reserved name")]
    Reserved,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("Password too short (minimum {min} characters)")]
    TooShort { min: usize },

    #[error("Password too long (maximum {max} characters)")]
    TooLong { max: usize },
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SlotNameError {
    #[error("Save slot name cannot be empty")]
    Empty,

    #[error("Save slot name too long (maximum {max} characters)")]
    TooLong { max: usize },

    #[error("Save slot name must contain only letters, numbers, underscore, and hyphen")]
    InvalidCharacters,
}

pub const MAX_PASSWORD_LENGTH: usize = 128;
pub const MAX_SLOT_LENGTH: usize = 32;

/// Username validation rules configuration
#[derive(Debug, Clone)]
pub struct UsernameRules {
    pub min_length: usize,
    pub max_length: usize,
    pub allow_spaces: bool,
    pub allow_unicode: bool,
    pub allow_special_chars: bool,
}

impl UsernameRules {
    /// Rules for player accounts
    pub fn player() -> Self {
        UsernameRules {
            min_length: 2,
            max_length: 30,
            allow_spaces: true,
            allow_unicode: true,
            allow_special_chars: true,
        }
    }
}

/// Generate safe filename from username using URL encoding
pub fn safe_filename(username: &str) -> String {
    use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
    utf8_percent_encode(username, NON_ALPHANUMERIC).to_string()
}

/// Names that could be confused with system accounts or game commands
fn reserved_names() -> HashSet<&'static str> {
    [
        "admin", "administrator", "root", "system", "operator",
        "guest", "anonymous", "nobody",
        "con", "prn", "aux", "nul", "com1", "com2", "com3", "com4", "com5", "com6", "com7", "com8", "com9",
        "lpt1", "lpt2", "lpt3", "lpt4", "lpt5", "lpt6", "lpt7", "lpt8", "lpt9",
        "help", "login", "logout", "register", "quit", "exit", "hint", "save", "load",
    ]
    .iter()
    .copied()
    .collect()
}

/// Validate a username according to the given rules
pub fn validate_username(username: &str, rules: &UsernameRules) -> Result<String, UsernameError> {
    let trimmed = username.trim();
    let length = trimmed.chars().count();

    if length < rules.min_length {
        return Err(UsernameError::TooShort { min: rules.min_length });
    }
    if length > rules.max_length {
        return Err(UsernameError::TooLong { max: rules.max_length });
    }

    if trimmed != username {
        return Err(UsernameError::InvalidWhitespace);
    }

    if reserved_names().contains(trimmed.to_lowercase().as_str()) {
        return Err(UsernameError::Reserved);
    }

    if trimmed.contains("..") || trimmed.contains('/') || trimmed.contains('\\') {
        return Err(UsernameError::PathTraversal);
    }

    let fs_reserved = ['<', '>', ':', '"', '|', '?', '*', '\0'];
    if trimmed.chars().any(|c| fs_reserved.contains(&c)) {
        return Err(UsernameError::FilesystemReserved);
    }

    if trimmed.chars().any(|c| c.is_control()) {
        let control_chars: String = trimmed
            .chars()
            .filter(|c| c.is_control())
            .map(|c| format!("\\u{{{:04x}}}", c as u32))
            .collect::<Vec<_>>()
            .join(", ");
        return Err(UsernameError::InvalidCharacters { chars: control_chars });
    }

    let mut invalid_chars = Vec::new();
    for ch in trimmed.chars() {
        let valid = if ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' || ch == '.' {
            true
        } else if ch == ' ' {
            rules.allow_spaces
        } else if !ch.is_ascii() {
            rules.allow_unicode
        } else if "!@#$%^&()+=[]{};',`~".contains(ch) {
            rules.allow_special_chars
        } else {
            false
        };
        if !valid {
            invalid_chars.push(ch);
        }
    }

    if !invalid_chars.is_empty() {
        let unique_chars: HashSet<char> = invalid_chars.into_iter().collect();
        let chars_str: String = unique_chars.into_iter().collect();
        return Err(UsernameError::InvalidCharacters { chars: chars_str });
    }

    Ok(trimmed.to_string())
}

/// Validate a player name with the default rules
pub fn validate_player_name(name: &str) -> Result<String, UsernameError> {
    validate_username(name, &UsernameRules::player())
}

/// Check password length bounds (counted in characters)
pub fn validate_password(password: &str, min_length: usize) -> Result<(), PasswordError> {
    let length = password.chars().count();
    if length < min_length {
        return Err(PasswordError::TooShort { min: min_length });
    }
    if length > MAX_PASSWORD_LENGTH {
        return Err(PasswordError::TooLong { max: MAX_PASSWORD_LENGTH });
    }
    Ok(())
}

/// Validate a save-slot name; returns the trimmed name
pub fn validate_slot_name(slot: &str) -> Result<String, SlotNameError> {
    let trimmed = slot.trim();
    if trimmed.is_empty() {
        return Err(SlotNameError::Empty);
    }
    if trimmed.chars().count() > MAX_SLOT_LENGTH {
        return Err(SlotNameError::TooLong { max: MAX_SLOT_LENGTH });
    }
    if !trimmed.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        return Err(SlotNameError::InvalidCharacters);
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_validation() {
        assert!(validate_player_name("martin").is_ok());
        assert!(validate_player_name("Al Sayeed Bin Ramen").is_ok());
        assert!(validate_player_name("José María").is_ok());

        assert!(validate_player_name("x").is_err());
        assert!(validate_player_name(&"a".repeat(31)).is_err());
        assert!(validate_player_name(" padded").is_err());
        assert!(validate_player_name("../etc/passwd").is_err());
        assert!(validate_player_name("user/file").is_err());
        assert!(validate_player_name("bad\u{7}bell").is_err());
        assert!(validate_player_name("what?").is_err());

        assert!(validate_player_name("admin").is_err());
        assert!(validate_player_name("Logout").is_err());
    }

    #[test]
    fn test_safe_filename() {
        assert_eq!(safe_filename("martin"), "martin");
        assert_eq!(safe_filename("Al Sayeed"), "Al%20Sayeed");
        assert_ne!(safe_filename("../etc/passwd"), "../etc/passwd");
        assert!(!safe_filename("user/file").contains('/'));
    }

    #[test]
    fn test_password_bounds() {
        assert_eq!(validate_password("short", 8), Err(PasswordError::TooShort { min: 8 }));
        assert!(validate_password("long enough", 8).is_ok());
        assert!(validate_password(&"p".repeat(129), 8).is_err());
    }

    #[test]
    fn test_slot_names() {
        assert_eq!(validate_slot_name(" s1 "), Ok("s1".to_string()));
        assert_eq!(validate_slot_name(""), Err(SlotNameError::Empty));
        assert!(validate_slot_name("../escape").is_err());
        assert!(validate_slot_name("with space").is_err());
        assert!(validate_slot_name(&"s".repeat(33)).is_err());
    }
}
