use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(
    Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for UserId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>().map(UserId)
    }
}

#[derive(
    Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(transparent)]
pub struct OrganizationId(pub i64);

/// A user as seen by the rest of the application, with permissions already
/// resolved through the user's role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub role: String,
    pub permissions: Vec<String>,
    pub organization_id: Option<OrganizationId>,
}

/// The identity embedded in every access and refresh token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityClaims {
    pub subject: UserId,
    pub email: String,
    pub role: String,
    pub permissions: Vec<String>,
    pub organization_id: Option<OrganizationId>,
}

impl From<&UserProfile> for IdentityClaims {
    fn from(user: &UserProfile) -> Self {
        IdentityClaims {
            subject: user.id,
            email: user.email.clone(),
            role: user.role.clone(),
            permissions: user.permissions.clone(),
            organization_id: user.organization_id,
        }
    }
}
