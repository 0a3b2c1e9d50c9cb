use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// System-wide role. Unknown values from the server decode as `User`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemRole {
    Admin,
    #[default]
    #[serde(other)]
    User,
}

impl SystemRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            SystemRole::Admin => "admin",
            SystemRole::User => "user",
        }
    }
}

/// Snapshot of an authenticated identity, as returned by the auth endpoints
/// and listed by the admin panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub system_role: SystemRole,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    /// Advisory gate for the admin panel. The server enforces the real check.
    pub fn is_admin(&self) -> bool {
        self.system_role == SystemRole::Admin
    }

    /// Name for display, falling back to the email when the name is blank.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.email
        } else {
            &self.name
        }
    }

    /// One or two uppercase initials for avatars.
    pub fn initials(&self) -> String {
        self.display_name()
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .take(2)
            .flat_map(char::to_uppercase)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str) -> User {
        User {
            id: "u-1".to_string(),
            email: "ada@example.com".to_string(),
            name: name.to_string(),
            system_role: SystemRole::User,
            created_at: None,
        }
    }

    #[test]
    fn test_parse_user_with_role() {
        let json = r#"{"id":"u-1","email":"a@b.c","name":"Ada","system_role":"admin","created_at":"2024-03-01T10:00:00Z"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert!(user.is_admin());
        assert!(user.created_at.is_some());
    }

    #[test]
    fn test_missing_or_unknown_role_is_user() {
        let json = r#"{"id":"u-1","email":"a@b.c","name":"Ada"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.system_role, SystemRole::User);

        let json = r#"{"id":"u-1","email":"a@b.c","name":"Ada","system_role":"auditor"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert!(!user.is_admin());
    }

    #[test]
    fn test_display_name_and_initials() {
        assert_eq!(user("Ada Lovelace").initials(), "AL");
        assert_eq!(user("ada").initials(), "A");
        assert_eq!(user("  ").display_name(), "ada@example.com");
        assert_eq!(user("Grace Brewster Hopper").initials(), "GB");
    }
}
