//! Authentication primitives: credentials, sessions and password hashing.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a caller talks to a port or service.

use std::fmt;

use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::domain::{DisplayName, Handle, Player, PlayerId, PlayerValidationError, Role};

/// Minimum accepted password length.
pub const PASSWORD_MIN: usize = 6;
/// Maximum accepted password length.
pub const PASSWORD_MAX: usize = 128;
/// PBKDF2 rounds used when no override is configured.
pub const DEFAULT_PASSWORD_ITERATIONS: u32 = 200_000;

const SALT_BYTES: usize = 16;
const DIGEST_BYTES: usize = 32;
const TOKEN_BYTES: usize = 32;

/// Domain error returned when credential payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthValidationError {
    /// Handle was missing or blank once trimmed.
    EmptyHandle,
    /// Password was blank.
    EmptyPassword,
    /// Password length fell outside the accepted bounds.
    PasswordLength {
        /// Minimum accepted length.
        min: usize,
        /// Maximum accepted length.
        max: usize,
    },
    /// Handle or display name failed validation.
    Profile(PlayerValidationError),
}

impl fmt::Display for AuthValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyHandle => write!(f, "handle must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::PasswordLength { min, max } => {
                write!(f, "password must be between {min} and {max} characters")
            }
            Self::Profile(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for AuthValidationError {}

impl From<PlayerValidationError> for AuthValidationError {
    fn from(value: PlayerValidationError) -> Self {
        Self::Profile(value)
    }
}

/// Validated login credentials used by authentication services.
///
/// ## Invariants
/// - `handle` is trimmed, lowercased and non-empty.
/// - `password` is required to be non-empty but retains caller-provided
///   whitespace.
///
/// # Examples
/// ```
/// use scorekeeper::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" Alice ", "pass123").unwrap();
/// assert_eq!(creds.handle(), "alice");
/// assert_eq!(creds.password(), "pass123");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    handle: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw handle/password inputs.
    pub fn try_from_parts(handle: &str, password: &str) -> Result<Self, AuthValidationError> {
        let normalized = crate::domain::normalize_handle(handle);
        if normalized.is_empty() {
            return Err(AuthValidationError::EmptyHandle);
        }

        if password.is_empty() {
            return Err(AuthValidationError::EmptyPassword);
        }

        Ok(Self {
            handle: normalized,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Normalised handle suitable for lookups.
    pub fn handle(&self) -> &str {
        self.handle.as_str()
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validated account registration request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    handle: Handle,
    display_name: DisplayName,
    password: Zeroizing<String>,
    role: Role,
}

impl Registration {
    /// Validate raw registration inputs; `role` defaults to [`Role::Player`].
    pub fn try_from_parts(
        handle: &str,
        display_name: &str,
        password: &str,
        role: Option<Role>,
    ) -> Result<Self, AuthValidationError> {
        let handle = Handle::new(handle)?;
        let display_name = DisplayName::new(display_name)?;
        if password.is_empty() {
            return Err(AuthValidationError::EmptyPassword);
        }
        let length = password.chars().count();
        if !(PASSWORD_MIN..=PASSWORD_MAX).contains(&length) {
            return Err(AuthValidationError::PasswordLength {
                min: PASSWORD_MIN,
                max: PASSWORD_MAX,
            });
        }

        Ok(Self {
            handle,
            display_name,
            password: Zeroizing::new(password.to_owned()),
            role: role.unwrap_or_default(),
        })
    }

    /// Requested handle.
    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    /// Requested display name.
    pub fn display_name(&self) -> &DisplayName {
        &self.display_name
    }

    /// Plain password to hash before storage.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// Requested role.
    pub fn role(&self) -> Role {
        self.role
    }
}

/// Authenticated identity: who is acting and in which role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal {
    /// Acting player.
    pub id: PlayerId,
    /// Role at authentication time.
    pub role: Role,
}

impl From<&Player> for Principal {
    fn from(value: &Player) -> Self {
        Self {
            id: value.id,
            role: value.role,
        }
    }
}

/// Opaque bearer token identifying a session.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Issue a fresh random token.
    pub fn generate() -> Self {
        let mut bytes = [0_u8; TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    /// Wrap a token presented by a caller.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Token text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

/// Extract the token from an `Authorization` header value.
///
/// The `Bearer` scheme is matched case-insensitively; anything else yields
/// `None`.
///
/// # Examples
/// ```
/// use scorekeeper::domain::bearer_token;
///
/// assert_eq!(bearer_token("Bearer abc123"), Some("abc123"));
/// assert_eq!(bearer_token("bearer  abc123 "), Some("abc123"));
/// assert_eq!(bearer_token("Basic abc123"), None);
/// ```
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, rest) = header.trim().split_once(char::is_whitespace)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = rest.trim();
    (!token.is_empty()).then_some(token)
}

/// PBKDF2-HMAC-SHA256 password hashing in `"<salt>$<hex digest>"` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHasher {
    iterations: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_PASSWORD_ITERATIONS)
    }
}

impl PasswordHasher {
    /// Hasher running `iterations` PBKDF2 rounds (at least one).
    pub fn new(iterations: u32) -> Self {
        Self {
            iterations: iterations.max(1),
        }
    }

    /// Configured round count.
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Hash `password` under a fresh random salt.
    pub fn hash(&self, password: &str) -> String {
        let mut salt = [0_u8; SALT_BYTES];
        OsRng.fill_bytes(&mut salt);
        let salt = hex::encode(salt);
        let digest = self.digest(password, &salt);
        format!("{salt}${}", hex::encode(digest))
    }

    /// Check `password` against a stored hash in constant time.
    ///
    /// Malformed stored values never verify.
    pub fn verify(&self, password: &str, stored: &str) -> bool {
        let Some((salt, expected_hex)) = stored.split_once('$') else {
            return false;
        };
        let Ok(expected) = hex::decode(expected_hex) else {
            return false;
        };
        let digest = self.digest(password, salt);
        bool::from(digest[..].ct_eq(&expected[..]))
    }

    fn digest(&self, password: &str, salt: &str) -> Zeroizing<[u8; DIGEST_BYTES]> {
        let mut out = Zeroizing::new([0_u8; DIGEST_BYTES]);
        pbkdf2_hmac::<Sha256>(
            password.as_bytes(),
            salt.as_bytes(),
            self.iterations,
            &mut out[..],
        );
        out
    }
}
