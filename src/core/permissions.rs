//! Role-based permission gate.
//!
//! Every mutating core function receives the caller as an [`Actor`] and checks it with
//! [`require`] before touching the database. Hiding buttons in a front end is only a
//! convenience layered on top of [`Permissions`]; the check here is the enforcement.

use crate::entities::user_profile::Role;
use crate::errors::{Error, Result};
use serde::Serialize;
use std::fmt;

/// Something a user may or may not do.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// See the calendar
    ViewCalendar,
    /// See the event list and event details
    ViewEvents,
    /// See financial reports
    ViewReports,
    /// Create events
    CreateEvent,
    /// Edit events and their installment schedules
    EditEvent,
    /// Delete events
    DeleteEvent,
    /// Create, edit and delete expenses
    ManageExpenses,
    /// See upcoming and overdue installment alerts
    ViewAlerts,
    /// Create profiles and change roles
    ManageUsers,
    /// Change the color scheme and alert thresholds
    ManageSettings,
}

impl Capability {
    /// Lowest role that holds this capability.
    #[must_use]
    pub const fn minimum_role(self) -> Role {
        match self {
            Self::ViewCalendar | Self::ViewEvents => Role::Viewer,
            Self::ViewReports
            | Self::CreateEvent
            | Self::EditEvent
            | Self::DeleteEvent
            | Self::ManageExpenses
            | Self::ViewAlerts => Role::Editor,
            Self::ManageUsers | Self::ManageSettings => Role::Admin,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl Role {
    /// Roles are a strict hierarchy, so a role holds a capability when it is at least
    /// the capability's minimum role.
    #[must_use]
    pub fn can(self, capability: Capability) -> bool {
        self >= capability.minimum_role()
    }
}

/// The authenticated caller of a request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Actor {
    /// Identifier issued by the external auth provider
    pub user_id: String,
    /// Role read from the caller's profile
    pub role: Role,
}

impl Actor {
    /// Builds an actor; mostly useful in tests and at startup.
    #[must_use]
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }
}

/// Fails with [`Error::Unauthorized`] unless `actor` holds `capability`.
pub fn require(actor: &Actor, capability: Capability) -> Result<()> {
    if actor.role.can(capability) {
        Ok(())
    } else {
        tracing::warn!(
            user_id = %actor.user_id,
            role = %actor.role,
            %capability,
            "Rejected unauthorized action"
        );
        Err(Error::Unauthorized {
            role: actor.role,
            capability,
        })
    }
}

/// Capability snapshot for a role, handed to clients so they can hide controls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct Permissions {
    /// [`Capability::ViewCalendar`]
    pub can_view_calendar: bool,
    /// [`Capability::ViewEvents`]
    pub can_view_events: bool,
    /// [`Capability::ViewReports`]
    pub can_view_reports: bool,
    /// [`Capability::CreateEvent`]
    pub can_create_event: bool,
    /// [`Capability::EditEvent`]
    pub can_edit_event: bool,
    /// [`Capability::DeleteEvent`]
    pub can_delete_event: bool,
    /// [`Capability::ManageExpenses`]
    pub can_manage_expenses: bool,
    /// [`Capability::ViewAlerts`]
    pub can_view_alerts: bool,
    /// [`Capability::ManageUsers`]
    pub can_manage_users: bool,
    /// [`Capability::ManageSettings`]
    pub can_manage_settings: bool,
}

impl Permissions {
    /// Flags for everything `role` may do.
    #[must_use]
    pub fn for_role(role: Role) -> Self {
        Self {
            can_view_calendar: role.can(Capability::ViewCalendar),
            can_view_events: role.can(Capability::ViewEvents),
            can_view_reports: role.can(Capability::ViewReports),
            can_create_event: role.can(Capability::CreateEvent),
            can_edit_event: role.can(Capability::EditEvent),
            can_delete_event: role.can(Capability::DeleteEvent),
            can_manage_expenses: role.can(Capability::ManageExpenses),
            can_view_alerts: role.can(Capability::ViewAlerts),
            can_manage_users: role.can(Capability::ManageUsers),
            can_manage_settings: role.can(Capability::ManageSettings),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Capability; 10] = [
        Capability::ViewCalendar,
        Capability::ViewEvents,
        Capability::ViewReports,
        Capability::CreateEvent,
        Capability::EditEvent,
        Capability::DeleteEvent,
        Capability::ManageExpenses,
        Capability::ViewAlerts,
        Capability::ManageUsers,
        Capability::ManageSettings,
    ];

    #[test]
    fn test_roles_form_a_hierarchy() {
        for capability in ALL {
            if Role::Viewer.can(capability) {
                assert!(Role::Editor.can(capability), "{capability}");
            }
            if Role::Editor.can(capability) {
                assert!(Role::Admin.can(capability), "{capability}");
            }
        }
    }

    #[test]
    fn test_admin_exclusive_capabilities() {
        for capability in [Capability::ManageUsers, Capability::ManageSettings] {
            assert!(Role::Admin.can(capability));
            assert!(!Role::Editor.can(capability));
            assert!(!Role::Viewer.can(capability));
        }
    }

    #[test]
    fn test_viewer_is_read_only() {
        let permissions = Permissions::for_role(Role::Viewer);
        assert!(permissions.can_view_calendar);
        assert!(permissions.can_view_events);
        assert!(!permissions.can_create_event);
        assert!(!permissions.can_edit_event);
        assert!(!permissions.can_delete_event);
        assert!(!permissions.can_manage_expenses);
        assert!(!permissions.can_view_reports);
    }

    #[test]
    fn test_require_rejects_viewer_delete() {
        let viewer = Actor::new("viewer-1", Role::Viewer);
        let result = require(&viewer, Capability::DeleteEvent);
        assert!(matches!(
            result,
            Err(Error::Unauthorized {
                role: Role::Viewer,
                capability: Capability::DeleteEvent
            })
        ));

        let editor = Actor::new("editor-1", Role::Editor);
        assert!(require(&editor, Capability::DeleteEvent).is_ok());
    }
}
