// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Route Access Policy: which role may open which route.
//!
//! Loaded once at startup, either from the built-in help-desk catalog or
//! from a JSON file:
//!
//! ```json
//! {
//!   "routes": [
//!     { "id": "users", "path": "/dashboard/users", "navLabel": "Manage Users",
//!       "navOrder": 40, "allowedRoles": ["ADMIN"] }
//!   ]
//! }
//! ```
//!
//! An empty `allowedRoles` list means any authenticated role.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::Role;

/// Stable route identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteId(Cow<'static, str>);

impl RouteId {
    pub const fn from_static(id: &'static str) -> Self {
        Self(Cow::Borrowed(id))
    }

    pub fn new(id: impl Into<Cow<'static, str>>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RouteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Route ids of the built-in catalog.
pub mod routes {
    use super::RouteId;

    pub const DASHBOARD: RouteId = RouteId::from_static("dashboard");
    pub const TICKETS: RouteId = RouteId::from_static("tickets");
    pub const EQUIPMENT: RouteId = RouteId::from_static("equipment");
    pub const USERS: RouteId = RouteId::from_static("users");
    pub const PROFILE: RouteId = RouteId::from_static("profile");
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSpec {
    pub id: RouteId,
    pub path: String,
    /// Routes without a label are reachable but not listed in navigation
    pub nav_label: Option<String>,
    pub nav_order: u32,
    /// Empty means any authenticated role
    pub allowed_roles: BTreeSet<Role>,
}

impl RouteSpec {
    pub fn permits(&self, role: Role) -> bool {
        self.allowed_roles.is_empty() || self.allowed_roles.contains(&role)
    }
}

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("Failed to read route policy {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid route policy JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Route policy contains an empty route id")]
    EmptyRouteId,

    #[error("Route '{0}' is defined more than once")]
    DuplicateRoute(String),

    #[error("Route '{route}' names unknown role '{role}'")]
    UnknownRole { route: String, role: String },
}

/// On-disk shape. Roles stay strings until validated.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PolicyFile {
    routes: Vec<RouteEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RouteEntry {
    id: String,
    path: String,
    #[serde(default)]
    nav_label: Option<String>,
    #[serde(default)]
    nav_order: u32,
    #[serde(default)]
    allowed_roles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteAccessPolicy {
    routes: BTreeMap<RouteId, RouteSpec>,
}

impl RouteAccessPolicy {
    /// The help-desk catalog.
    pub fn builtin() -> Self {
        let spec = |id: RouteId, path: &str, label: &str, order: u32, roles: &[Role]| RouteSpec {
            id,
            path: path.to_string(),
            nav_label: Some(label.to_string()),
            nav_order: order,
            allowed_roles: roles.iter().copied().collect(),
        };

        let routes = [
            spec(routes::DASHBOARD, "/dashboard", "Home", 10, &[]),
            spec(routes::TICKETS, "/dashboard/tickets", "Manage Tickets", 20, &[]),
            spec(
                routes::EQUIPMENT,
                "/dashboard/equipment",
                "Equipment",
                30,
                &[Role::Admin, Role::Technician],
            ),
            spec(routes::USERS, "/dashboard/users", "Manage Users", 40, &[Role::Admin]),
            spec(routes::PROFILE, "/dashboard/profile", "Manage Profile", 50, &[]),
        ];

        Self {
            routes: routes.into_iter().map(|r| (r.id.clone(), r)).collect(),
        }
    }

    /// Build a policy, rejecting empty and duplicate ids.
    pub fn from_specs(specs: impl IntoIterator<Item = RouteSpec>) -> Result<Self, PolicyError> {
        let mut routes = BTreeMap::new();
        for spec in specs {
            if spec.id.as_str().trim().is_empty() {
                return Err(PolicyError::EmptyRouteId);
            }
            if routes.contains_key(&spec.id) {
                return Err(PolicyError::DuplicateRoute(spec.id.to_string()));
            }
            routes.insert(spec.id.clone(), spec);
        }
        Ok(Self { routes })
    }

    pub fn from_json(raw: &str) -> Result<Self, PolicyError> {
        let file: PolicyFile = serde_json::from_str(raw)?;
        let specs = file
            .routes
            .into_iter()
            .map(|entry| {
                let allowed_roles = entry
                    .allowed_roles
                    .iter()
                    .map(|raw| {
                        Role::from_str(raw).ok_or_else(|| PolicyError::UnknownRole {
                            route: entry.id.clone(),
                            role: raw.clone(),
                        })
                    })
                    .collect::<Result<BTreeSet<_>, _>>()?;
                Ok(RouteSpec {
                    id: RouteId::new(entry.id),
                    path: entry.path,
                    nav_label: entry.nav_label.filter(|l| !l.trim().is_empty()),
                    nav_order: entry.nav_order,
                    allowed_roles,
                })
            })
            .collect::<Result<Vec<_>, PolicyError>>()?;
        Self::from_specs(specs)
    }

    pub fn load(path: &Path) -> Result<Self, PolicyError> {
        let raw = std::fs::read_to_string(path).map_err(|source| PolicyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let policy = Self::from_json(&raw)?;
        tracing::info!(path = %path.display(), routes = policy.len(), "Loaded route policy");
        Ok(policy)
    }

    pub fn get(&self, id: &RouteId) -> Option<&RouteSpec> {
        self.routes.get(id)
    }

    /// Routes in id order.
    pub fn routes(&self) -> impl Iterator<Item = &RouteSpec> {
        self.routes.values()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl Default for RouteAccessPolicy {
    fn default() -> Self {
        Self::builtin()
    }
}
