//! Identity data model.
//!
//! Identities are owned by the profile store; this crate only reads them to
//! resolve external ids and to render display names.

use serde::{Deserialize, Serialize};

/// A user known to the profile store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Internal surrogate key.
    pub id: i64,
    /// External numeric id (e.g. a chat platform user id).
    pub user_id: u64,
    /// Current username.
    pub username: String,
    /// Discriminator suffix shown after the username.
    pub discriminator: String,
}

impl Identity {
    pub fn new(
        id: i64,
        user_id: u64,
        username: impl Into<String>,
        discriminator: impl Into<String>,
    ) -> Self {
        Self {
            id,
            user_id,
            username: username.into(),
            discriminator: discriminator.into(),
        }
    }

    /// Returns the display name in `name#discriminator` form.
    pub fn full_name(&self) -> String {
        format_full_name(&self.username, &self.discriminator)
    }
}

/// Formats a display name from its parts.
pub fn format_full_name(username: &str, discriminator: &str) -> String {
    format!("{}#{}", username, discriminator)
}

/// Converts an external id to its stored representation.
///
/// External ids are persisted as signed 64-bit integers, so an id above
/// `i64::MAX` can never match a stored identity.
pub fn stored_user_id(user_id: u64) -> Option<i64> {
    i64::try_from(user_id).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name() {
        let identity = Identity::new(1, 105_635_576_866_156_544, "kwoth", "0001");
        assert_eq!(identity.full_name(), "kwoth#0001");
    }

    #[test]
    fn test_stored_user_id_bounds() {
        assert_eq!(stored_user_id(42), Some(42));
        assert_eq!(stored_user_id(i64::MAX as u64), Some(i64::MAX));
        assert_eq!(stored_user_id(u64::MAX), None);
    }
}
