use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Type of JWT: access or refresh.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Capability level of a user. The edit affordance and nothing else hangs off
/// `Admin`; plain mutation auth only requires a valid access token.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Reader,
}

impl UserRole {
    pub fn is_admin(self) -> bool {
        matches!(self, UserRole::Admin)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Reader => "reader",
        }
    }

    /// Rows store the role as TEXT; anything unrecognized degrades to reader.
    pub fn from_db(s: &str) -> Self {
        match s {
            "admin" => UserRole::Admin,
            _ => UserRole::Reader,
        }
    }
}

/// JWT payload used for authentication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,       // user ID
    pub role: UserRole,  // capability level at issue time
    pub iat: usize,      // issued at (unix timestamp)
    pub exp: usize,      // expires at (unix timestamp)
    pub iss: String,     // issuer
    pub aud: String,     // audience
    pub kind: TokenKind, // token type
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_db_text() {
        assert_eq!(UserRole::from_db("admin"), UserRole::Admin);
        assert_eq!(UserRole::from_db("reader"), UserRole::Reader);
        assert_eq!(UserRole::from_db("editor-in-chief"), UserRole::Reader);
        assert_eq!(UserRole::Admin.as_str(), "admin");
    }

    #[test]
    fn only_admin_satisfies_the_predicate() {
        assert!(UserRole::Admin.is_admin());
        assert!(!UserRole::Reader.is_admin());
    }
}
