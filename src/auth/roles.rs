// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Help-desk roles for authorization.

use serde::{Deserialize, Deserializer, Serialize};

/// Help-desk roles.
///
/// ## Role Semantics
///
/// - `Admin` - Full access: user management, equipment, every ticket
/// - `Technician` - Works assigned tickets, sees equipment
/// - `Employee` - Files and follows their own tickets
///
/// The set is closed. Anything the backend sends that is not recognized
/// collapses to `Employee`, never to an elevated role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Full administrative access
    Admin,
    /// Support technician
    Technician,
    /// Regular employee (least privilege)
    Employee,
}

impl Role {
    /// All roles, most privileged first.
    pub const ALL: [Role; 3] = [Role::Admin, Role::Technician, Role::Employee];

    /// Parse role from string (case-insensitive).
    ///
    /// `USER` is the backend's historical name for `Employee`.
    pub fn from_str(s: &str) -> Option<Role> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Some(Role::Admin),
            "TECHNICIAN" => Some(Role::Technician),
            "EMPLOYEE" | "USER" => Some(Role::Employee),
            _ => None,
        }
    }

    /// Parse a wire role, falling back to `Employee` for missing or
    /// unrecognized values.
    pub fn from_wire(raw: Option<&str>) -> Role {
        match raw {
            Some(s) => Role::from_str(s).unwrap_or_else(|| {
                tracing::warn!(role = %s, "Unrecognized role, using least privilege");
                Role::Employee
            }),
            None => Role::Employee,
        }
    }

    /// Wire form of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Technician => "TECHNICIAN",
            Role::Employee => "EMPLOYEE",
        }
    }
}

impl Default for Role {
    /// Default role is Employee (least privilege for authenticated users).
    fn default() -> Self {
        Role::Employee
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(Role::from_wire(raw.as_deref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_str_parses_correctly() {
        assert_eq!(Role::from_str("ADMIN"), Some(Role::Admin));
        assert_eq!(Role::from_str("admin"), Some(Role::Admin));
        assert_eq!(Role::from_str("Technician"), Some(Role::Technician));
        assert_eq!(Role::from_str("EMPLOYEE"), Some(Role::Employee));
        assert_eq!(Role::from_str("superuser"), None);
    }

    #[test]
    fn legacy_user_role_is_employee() {
        assert_eq!(Role::from_str("USER"), Some(Role::Employee));
    }

    #[test]
    fn unknown_or_missing_wire_role_is_least_privilege() {
        assert_eq!(Role::from_wire(Some("ROOT")), Role::Employee);
        assert_eq!(Role::from_wire(Some("")), Role::Employee);
        assert_eq!(Role::from_wire(None), Role::Employee);
    }

    #[test]
    fn default_role_is_employee() {
        assert_eq!(Role::default(), Role::Employee);
    }

    #[test]
    fn serde_uses_upper_case_and_tolerates_garbage() {
        assert_eq!(serde_json::to_string(&Role::Technician).unwrap(), "\"TECHNICIAN\"");

        let role: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, Role::Admin);

        let role: Role = serde_json::from_str("\"GOD_MODE\"").unwrap();
        assert_eq!(role, Role::Employee);

        let role: Role = serde_json::from_str("null").unwrap();
        assert_eq!(role, Role::Employee);
    }
}
