use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateProjectRequest {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateProjectRequest {
    pub name: String,
    pub description: String,
}

/// Role of a user within one project.
///
/// Role gates in this crate are advisory and only decide what to offer;
/// the server rejects anything the caller is not allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectRole {
    #[serde(rename = "PO", alias = "po")]
    Owner,
    #[serde(rename = "PM", alias = "pm")]
    Manager,
    #[serde(rename = "Member", alias = "member")]
    Member,
    #[serde(rename = "Viewer", alias = "viewer")]
    Viewer,
}

impl ProjectRole {
    /// Roles that can be granted through an invitation or a role change.
    pub const ASSIGNABLE: [ProjectRole; 3] =
        [ProjectRole::Manager, ProjectRole::Member, ProjectRole::Viewer];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectRole::Owner => "PO",
            ProjectRole::Manager => "PM",
            ProjectRole::Member => "Member",
            ProjectRole::Viewer => "Viewer",
        }
    }

    /// PO and PM may open project settings, invite and remove members.
    pub fn can_manage_members(&self) -> bool {
        matches!(self, ProjectRole::Owner | ProjectRole::Manager)
    }

    /// Only the PO may change member roles or delete the project.
    pub fn can_change_roles(&self) -> bool {
        matches!(self, ProjectRole::Owner)
    }

    pub fn is_assignable(&self) -> bool {
        Self::ASSIGNABLE.contains(self)
    }
}

impl fmt::Display for ProjectRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "po" | "owner" => Ok(ProjectRole::Owner),
            "pm" | "manager" => Ok(ProjectRole::Manager),
            "member" => Ok(ProjectRole::Member),
            "viewer" => Ok(ProjectRole::Viewer),
            other => Err(format!("unknown project role '{}' (expected PO, PM, Member or Viewer)", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectMember {
    #[serde(default)]
    pub id: String,
    pub project_id: String,
    pub user_id: String,
    pub role: ProjectRole,
    #[serde(default)]
    pub joined_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

impl ProjectMember {
    /// Role of `user_id` among `members`, if they belong to the project.
    pub fn role_of(members: &[ProjectMember], user_id: &str) -> Option<ProjectRole> {
        members.iter().find(|m| m.user_id == user_id).map(|m| m.role)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InviteMemberRequest {
    pub email: String,
    pub role: ProjectRole,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateMemberRoleRequest {
    pub role: ProjectRole,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_format() {
        assert_eq!(serde_json::to_string(&ProjectRole::Owner).unwrap(), r#""PO""#);
        let role: ProjectRole = serde_json::from_str(r#""viewer""#).unwrap();
        assert_eq!(role, ProjectRole::Viewer);
        let role: ProjectRole = serde_json::from_str(r#""PM""#).unwrap();
        assert_eq!(role, ProjectRole::Manager);
    }

    #[test]
    fn test_role_gates() {
        assert!(ProjectRole::Owner.can_manage_members());
        assert!(ProjectRole::Manager.can_manage_members());
        assert!(!ProjectRole::Member.can_manage_members());
        assert!(ProjectRole::Owner.can_change_roles());
        assert!(!ProjectRole::Manager.can_change_roles());
        assert!(!ProjectRole::Owner.is_assignable());
        assert!(ProjectRole::Viewer.is_assignable());
    }

    #[test]
    fn test_role_of_member() {
        let json = r#"[
            {"id":"m-1","project_id":"p-1","user_id":"u-1","role":"PO","joined_at":"2024-01-01T00:00:00Z","name":"Ada","email":"ada@example.com"},
            {"id":"m-2","project_id":"p-1","user_id":"u-2","role":"Viewer","joined_at":"2024-01-02T00:00:00Z","name":"Bob","email":"bob@example.com"}
        ]"#;
        let members: Vec<ProjectMember> = serde_json::from_str(json).unwrap();
        assert_eq!(ProjectMember::role_of(&members, "u-2"), Some(ProjectRole::Viewer));
        assert_eq!(ProjectMember::role_of(&members, "u-3"), None);
    }
}
