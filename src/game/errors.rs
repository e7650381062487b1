use thiserror::Error;

/// Errors that can arise while building or persisting escape-room state.
///
/// Gameplay rejections (wrong answers, locked exits, missing items) are never
/// reported through this type; they travel as messages inside
/// [`ValidationResult`](crate::game::ValidationResult) or
/// [`RoomChange`](crate::game::RoomChange).
#[derive(Debug, Error)]
pub enum GameError {
    /// Wrapper around IO errors (data directory creation, file reads, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapper around JSON serialization and deserialization errors.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Static content that cannot produce a playable object graph.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Returned when fetching a record that is not present.
    #[error("record not found: {0}")]
    NotFound(String),

    /// Password hashing or hash parsing failure.
    #[error("password hash error: {0}")]
    PasswordHash(String),

    /// Rejected user input outside of gameplay (usernames, passwords, slot names).
    #[error("validation failed: {0}")]
    Validation(String),
}
