//! Tournament participants and viewers.
//!
//! Every registered account is a [`Player`] record; only accounts carrying the
//! [`Role::Player`] role take part in matches; viewers may only read.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Validation errors returned by the player value constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlayerValidationError {
    /// Player identifiers are positive database keys.
    #[error("player id must be positive")]
    NonPositiveId,
    /// Handle length fell outside the accepted bounds.
    #[error("handle must be between {min} and {max} characters")]
    HandleLength {
        /// Minimum accepted length.
        min: usize,
        /// Maximum accepted length.
        max: usize,
    },
    /// Handle contained characters outside `[a-z0-9_.-]`.
    #[error("handle may only contain letters, digits, '_', '.' or '-'")]
    HandleInvalidCharacters,
    /// Display name length fell outside the accepted bounds.
    #[error("display name must be between {min} and {max} characters")]
    DisplayNameLength {
        /// Minimum accepted length.
        min: usize,
        /// Maximum accepted length.
        max: usize,
    },
    /// Role string was neither `player` nor `viewer`.
    #[error("unknown role '{0}'")]
    UnknownRole(String),
}

/// Stable player identifier assigned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct PlayerId(i64);

impl PlayerId {
    /// Validate and wrap a raw identifier.
    pub fn new(raw: i64) -> Result<Self, PlayerValidationError> {
        if raw <= 0 {
            return Err(PlayerValidationError::NonPositiveId);
        }
        Ok(Self(raw))
    }

    /// Raw numeric value, as stored.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for PlayerId {
    type Error = PlayerValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PlayerId> for i64 {
    fn from(value: PlayerId) -> Self {
        value.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Minimum handle length.
pub const HANDLE_MIN: usize = 3;
/// Maximum handle length.
pub const HANDLE_MAX: usize = 32;

/// Unique login handle, normalised to trimmed lowercase.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Handle(String);

impl Handle {
    /// Normalise and validate a raw handle.
    ///
    /// # Examples
    /// ```
    /// use scorekeeper::domain::Handle;
    ///
    /// let handle = Handle::new("  Alice.M ").unwrap();
    /// assert_eq!(handle.as_ref(), "alice.m");
    /// ```
    pub fn new(raw: impl AsRef<str>) -> Result<Self, PlayerValidationError> {
        let normalized = normalize_handle(raw.as_ref());
        let length = normalized.chars().count();
        if !(HANDLE_MIN..=HANDLE_MAX).contains(&length) {
            return Err(PlayerValidationError::HandleLength {
                min: HANDLE_MIN,
                max: HANDLE_MAX,
            });
        }
        let allowed = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit() || "_.-".contains(c);
        if !normalized.chars().all(allowed) {
            return Err(PlayerValidationError::HandleInvalidCharacters);
        }
        Ok(Self(normalized))
    }
}

/// Trim and lowercase a handle without validating it.
///
/// Lookups normalise with this so `" Bob "` finds `bob`.
pub fn normalize_handle(raw: &str) -> String {
    raw.trim().to_lowercase()
}

impl AsRef<str> for Handle {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Handle {
    type Error = PlayerValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Handle> for String {
    fn from(value: Handle) -> Self {
        value.0
    }
}

/// Minimum display name length.
pub const DISPLAY_NAME_MIN: usize = 2;
/// Maximum display name length.
pub const DISPLAY_NAME_MAX: usize = 80;

/// Human readable name shown in standings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DisplayName(String);

impl DisplayName {
    /// Trim and validate a display name.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, PlayerValidationError> {
        let trimmed = raw.as_ref().trim();
        let length = trimmed.chars().count();
        if !(DISPLAY_NAME_MIN..=DISPLAY_NAME_MAX).contains(&length) {
            return Err(PlayerValidationError::DisplayNameLength {
                min: DISPLAY_NAME_MIN,
                max: DISPLAY_NAME_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Lowercased form used for case-insensitive ordering.
    pub fn sort_key(&self) -> String {
        self.0.to_lowercase()
    }
}

impl AsRef<str> for DisplayName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for DisplayName {
    type Error = PlayerValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DisplayName> for String {
    fn from(value: DisplayName) -> Self {
        value.0
    }
}

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Takes part in matches and submits scores.
    #[default]
    Player,
    /// Read-only spectator.
    Viewer,
}

impl Role {
    /// Stored string form.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::Viewer => "viewer",
        }
    }
}

impl FromStr for Role {
    type Err = PlayerValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "player" => Ok(Self::Player),
            "viewer" => Ok(Self::Viewer),
            other => Err(PlayerValidationError::UnknownRole(other.to_owned())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered account.
///
/// ## Invariants
/// - `handle` is unique across the store (enforced by adapters).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Store-assigned identifier.
    pub id: PlayerId,
    /// Unique normalised handle.
    pub handle: Handle,
    /// Name shown to other participants.
    pub display_name: DisplayName,
    /// Participation role.
    pub role: Role,
}

impl Player {
    /// Whether this account takes part in matches.
    pub fn competes(&self) -> bool {
        self.role == Role::Player
    }

    /// Compact projection embedded in match views.
    pub fn lite(&self) -> PlayerLite {
        PlayerLite {
            id: self.id,
            handle: self.handle.clone(),
            display_name: self.display_name.clone(),
        }
    }
}

/// Compact player reference used in match views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerLite {
    /// Player identifier.
    pub id: PlayerId,
    /// Unique handle.
    pub handle: Handle,
    /// Display name.
    pub display_name: DisplayName,
}

#[cfg(test)]
mod tests;
