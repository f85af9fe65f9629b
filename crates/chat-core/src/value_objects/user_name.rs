//! Display name of a chat participant

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

/// Validated user display name
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserName(String);

impl UserName {
    /// Maximum user name length in characters
    pub const MAX_LEN: usize = 32;

    /// Create a user name, trimming surrounding whitespace
    pub fn new(name: impl AsRef<str>) -> Result<Self, DomainError> {
        super::normalize_key(name.as_ref(), Self::MAX_LEN)
            .map(Self)
            .map_err(DomainError::InvalidUserName)
    }

    /// Generate a placeholder name of the form `User-N`
    #[must_use]
    pub fn random() -> Self {
        let n: u16 = rand::thread_rng().gen_range(0..999);
        Self(format!("User-{n}"))
    }

    /// Use `input` when it is a valid name, otherwise a random placeholder.
    ///
    /// Blank input always yields a placeholder; other invalid input is an error.
    pub fn or_random(input: &str) -> Result<Self, DomainError> {
        if input.trim().is_empty() {
            Ok(Self::random())
        } else {
            Self::new(input)
        }
    }

    /// Borrow the name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserName {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserName> for String {
    fn from(user: UserName) -> Self {
        user.0
    }
}

impl std::str::FromStr for UserName {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
