//! Contact message model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Message submitted through the public contact form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactMessage {
    /// Unique identifier
    pub id: i64,
    /// Sender name
    pub name: String,
    /// Sender email
    pub email: String,
    /// Sender phone
    pub phone: Option<String>,
    /// Subject line
    pub subject: String,
    /// Message body
    pub message: String,
    /// Whether a staff member has read it
    pub read: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Input for the contact form
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateContactInput {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    pub phone: Option<String>,
    #[serde(default)]
    pub subject: String,
    #[validate(length(min = 1, max = 10000))]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_input_requires_message() {
        let input = CreateContactInput {
            name: "Visitor".to_string(),
            email: "visitor@example.com".to_string(),
            phone: None,
            subject: String::new(),
            message: String::new(),
        };
        assert!(input.validate().is_err());
    }
}
