use serde::{Deserialize, Serialize};

/// Organization role, ordered from least to most privileged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Viewer,
    Member,
    Manager,
    Admin,
    Owner,
}

impl Role {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "viewer" | "read" | "readonly" => Some(Role::Viewer),
            "member" | "user" => Some(Role::Member),
            "manager" => Some(Role::Manager),
            "admin" => Some(Role::Admin),
            "owner" => Some(Role::Owner),
            _ => None,
        }
    }

    /// Parse an `x-roles` header value; unknown names are dropped.
    pub fn parse_list(value: &str) -> Vec<Self> {
        let mut roles: Vec<Role> = value.split(',').filter_map(Role::parse).collect();
        roles.sort();
        roles.dedup();
        roles
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Viewer => "viewer",
            Role::Member => "member",
            Role::Manager => "manager",
            Role::Admin => "admin",
            Role::Owner => "owner",
        }
    }
}

/// Minimum role for each action on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    pub read: Role,
    pub write: Role,
    pub delete: Role,
    pub export: Role,
}

impl Policy {
    pub const STANDARD: Policy = Policy {
        read: Role::Viewer,
        write: Role::Member,
        delete: Role::Member,
        export: Role::Manager,
    };

    pub const RESTRICTED: Policy = Policy {
        read: Role::Viewer,
        write: Role::Admin,
        delete: Role::Admin,
        export: Role::Admin,
    };

    pub const AUDIT: Policy = Policy {
        read: Role::Admin,
        write: Role::Owner,
        delete: Role::Owner,
        export: Role::Admin,
    };
}

/// True when the highest of `held` ranks at or above `required`.
pub fn permits(held: &[Role], required: Role) -> bool {
    held.iter().max().is_some_and(|highest| *highest >= required)
}
