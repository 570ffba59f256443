use std::fmt;

use serde::Serialize;

use crate::error::{GraphError, Result};

/// Registry-assigned user identifier. Monotonic, never reused.
pub type UserId = u64;

/// Edge weight after normalization (always >= 1).
pub type Weight = u32;

/// Clamp a caller-supplied weight: anything non-positive becomes 1.
pub fn normalize_weight(raw: i64) -> Weight {
    if raw <= 0 {
        1
    } else {
        raw.min(Weight::MAX as i64) as Weight
    }
}

/// Caller-supplied user record, before the registry assigns an identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl NewUser {
    pub fn new(
        username: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
        }
    }

    /// The username is the external key and the ingestion token separator
    /// is whitespace, so it must be non-empty and whitespace-free.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.username.is_empty() {
            return Err(GraphError::InvalidProfile("username is empty".to_string()));
        }
        if self.username.chars().any(char::is_whitespace) {
            return Err(GraphError::InvalidProfile(format!(
                "username '{}' contains whitespace",
                self.username
            )));
        }
        Ok(())
    }
}

/// A user node. Identity (`id`, `username`) is fixed at creation; the display
/// fields can be updated through the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    id: UserId,
    username: String,
    first_name: String,
    last_name: String,
    email: String,
}

impl UserProfile {
    pub(crate) fn from_new(id: UserId, user: NewUser) -> Self {
        Self {
            id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
        }
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub(crate) fn set_display_fields(&mut self, first_name: String, last_name: String, email: String) {
        self.first_name = first_name;
        self.last_name = last_name;
        self.email = email;
    }
}

impl fmt::Display for UserProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "User ID: {}", self.id)?;
        writeln!(f, "Username: {}", self.username)?;
        writeln!(f, "First Name: {}", self.first_name)?;
        writeln!(f, "Last Name: {}", self.last_name)?;
        write!(f, "Email: {}", self.email)
    }
}

/// One directed half of a logical edge, stored in the source's adjacency list.
///
/// Endpoints are identifiers into the registry, not owned profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Connection {
    pub source: UserId,
    pub destination: UserId,
    pub weight: Weight,
}

impl Connection {
    pub fn new(source: UserId, destination: UserId, raw_weight: i64) -> Self {
        Self {
            source,
            destination,
            weight: normalize_weight(raw_weight),
        }
    }

    /// The paired record for the opposite direction.
    pub fn reversed(&self) -> Self {
        Self {
            source: self.destination,
            destination: self.source,
            weight: self.weight,
        }
    }
}
