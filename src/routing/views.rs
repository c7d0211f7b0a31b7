// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Role-based view composition: navigation entries and dashboard variant.

use std::sync::Arc;

use serde::Serialize;

use super::policy::{RouteAccessPolicy, RouteId};
use crate::auth::Role;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavEntry {
    pub label: String,
    pub route_id: RouteId,
    pub path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DashboardVariant {
    Admin,
    Technician,
    Employee,
}

impl DashboardVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            DashboardVariant::Admin => "admin",
            DashboardVariant::Technician => "technician",
            DashboardVariant::Employee => "employee",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ViewComposer {
    policy: Arc<RouteAccessPolicy>,
}

impl ViewComposer {
    pub fn new(policy: Arc<RouteAccessPolicy>) -> Self {
        Self { policy }
    }

    /// Navigation visible to `role`, ordered by `nav_order` then id.
    pub fn navigation_for(&self, role: Role) -> Vec<NavEntry> {
        let mut visible: Vec<_> = self
            .policy
            .routes()
            .filter(|spec| spec.permits(role))
            .filter_map(|spec| spec.nav_label.as_ref().map(|label| (spec, label)))
            .collect();
        visible.sort_by(|(a, _), (b, _)| a.nav_order.cmp(&b.nav_order).then_with(|| a.id.cmp(&b.id)));

        visible
            .into_iter()
            .map(|(spec, label)| NavEntry {
                label: label.clone(),
                route_id: spec.id.clone(),
                path: spec.path.clone(),
            })
            .collect()
    }

    /// Same as [`navigation_for`](Self::navigation_for) for a wire role
    /// string. Unknown or missing roles get the employee view.
    pub fn navigation_for_raw(&self, role: Option<&str>) -> Vec<NavEntry> {
        self.navigation_for(Role::from_wire(role))
    }

    pub fn dashboard_variant_for(&self, role: Role) -> DashboardVariant {
        match role {
            Role::Admin => DashboardVariant::Admin,
            Role::Technician => DashboardVariant::Technician,
            Role::Employee => DashboardVariant::Employee,
        }
    }

    pub fn dashboard_variant_for_raw(&self, role: Option<&str>) -> DashboardVariant {
        self.dashboard_variant_for(Role::from_wire(role))
    }
}
