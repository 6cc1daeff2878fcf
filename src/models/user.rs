//! User model
//!
//! Accounts cover three audiences: back-office admins, staff members who
//! manage content, and customers registered through the mobile API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// User entity representing a registered account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Username (unique)
    pub username: String,
    /// Email address (unique)
    pub email: String,
    /// Password hash (argon2)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// User role
    pub role: UserRole,
    /// Account status
    pub status: UserStatus,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new User. The password must already be hashed; use
    /// `services::password::hash_password()`.
    pub fn new(username: String, email: String, password_hash: String, role: UserRole) -> Self {
        let now = Utc::now();
        Self {
            id: 0, // Will be set by the database
            username,
            email,
            password_hash,
            role,
            status: UserStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if the user is an administrator
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Check if the user can access the back office
    pub fn is_staff(&self) -> bool {
        matches!(self.role, UserRole::Admin | UserRole::Staff)
    }

    /// Check if the account may log in
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}

/// User role for authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Administrator - full access
    Admin,
    /// Staff - back-office access without user management
    Staff,
    /// Customer - mobile/site account, no back-office access
    Customer,
}

impl Default for UserRole {
    fn default() -> Self {
        Self::Customer
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Admin => write!(f, "admin"),
            UserRole::Staff => write!(f, "staff"),
            UserRole::Customer => write!(f, "customer"),
        }
    }
}

impl FromStr for UserRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(UserRole::Admin),
            "staff" => Ok(UserRole::Staff),
            "customer" => Ok(UserRole::Customer),
            _ => Err(anyhow::anyhow!("Invalid user role: {}", s)),
        }
    }
}

/// Account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    /// Active - normal access
    Active,
    /// Disabled - cannot log in
    Disabled,
}

impl Default for UserStatus {
    fn default() -> Self {
        Self::Active
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserStatus::Active => write!(f, "active"),
            UserStatus::Disabled => write!(f, "disabled"),
        }
    }
}

impl FromStr for UserStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(UserStatus::Active),
            "disabled" => Ok(UserStatus::Disabled),
            _ => Err(anyhow::anyhow!("Invalid user status: {}", s)),
        }
    }
}

/// Input for creating a new user (before password hashing)
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserInput {
    /// Username
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    /// Email address
    #[validate(email)]
    pub email: String,
    /// Plaintext password (will be hashed)
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    /// User role (defaults to Customer; the first registered user
    /// becomes Admin regardless)
    pub role: Option<UserRole>,
}

/// Input for updating a user
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserInput {
    /// New username (optional)
    pub username: Option<String>,
    /// New email (optional)
    pub email: Option<String>,
    /// New password (optional, will be hashed)
    pub password: Option<String>,
    /// New role (optional)
    pub role: Option<UserRole>,
    /// New status (optional)
    pub status: Option<UserStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_new_defaults() {
        let user = User::new(
            "nile".to_string(),
            "nile@example.com".to_string(),
            "hash".to_string(),
            UserRole::Customer,
        );
        assert_eq!(user.id, 0);
        assert_eq!(user.status, UserStatus::Active);
        assert!(!user.is_admin());
        assert!(user.is_active());
    }

    #[test]
    fn test_is_staff() {
        let mut user = User::new(
            "a".into(),
            "a@example.com".into(),
            "hash".into(),
            UserRole::Admin,
        );
        assert!(user.is_staff());
        user.role = UserRole::Staff;
        assert!(user.is_staff());
        user.role = UserRole::Customer;
        assert!(!user.is_staff());
    }

    #[test]
    fn test_role_round_trip() {
        for role in [UserRole::Admin, UserRole::Staff, UserRole::Customer] {
            assert_eq!(UserRole::from_str(&role.to_string()).unwrap(), role);
        }
        assert!(UserRole::from_str("editor").is_err());
    }

    #[test]
    fn test_create_input_validation() {
        let input = CreateUserInput {
            username: "ab".to_string(),
            email: "not-an-email".to_string(),
            password: "short".to_string(),
            role: None,
        };
        assert!(input.validate().is_err());

        let input = CreateUserInput {
            username: "captain".to_string(),
            email: "captain@example.com".to_string(),
            password: "longenoughpw".to_string(),
            role: None,
        };
        assert!(input.validate().is_ok());
    }
}
