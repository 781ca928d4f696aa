//! Navigation: the closed set of portal screens, the single access table
//! deciding which role may view which screen, and the pure view selector.
//! Navigation itself is unconditional; legality is checked at selection
//! time, and a failed check yields an explicit `Unauthorized` fallback.

use crate::common::models::{Role, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Login,
    Register,
    // citizen screens
    Dashboard,
    SubmitReport,
    History,
    MapView,
    Profile,
    Notifications,
    HelpCenter,
    // field worker screens
    FieldWorkerDashboard,
    FieldWorkerNotifications,
    FieldWorkerProfile,
    // department head screens
    DepartmentHeadDashboard,
    DepartmentHeadNotifications,
    DepartmentHeadProfile,
    // district magistrate screens
    AdminDashboard,
    AdminNotifications,
    AdminProfile,
    AdminAnalytics,
    AdminUserManagement,
}

/// Who may view a page. One table, consulted in one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Citizen,
    OnlyRole(Role),
}

impl Access {
    pub fn permits(self, user: Option<&User>) -> bool {
        match self {
            Access::Public => true,
            Access::Citizen => {
                matches!(user, Some(u) if u.effective_role() == Role::Citizen)
            }
            Access::OnlyRole(role) => {
                matches!(user, Some(u) if u.effective_role() == role)
            }
        }
    }
}

impl Page {
    pub fn required_access(self) -> Access {
        use Page::*;
        match self {
            Login | Register => Access::Public,
            Dashboard | SubmitReport | History | MapView | Profile | Notifications
            | HelpCenter => Access::Citizen,
            FieldWorkerDashboard | FieldWorkerNotifications | FieldWorkerProfile => {
                Access::OnlyRole(Role::FieldWorker)
            }
            DepartmentHeadDashboard | DepartmentHeadNotifications | DepartmentHeadProfile => {
                Access::OnlyRole(Role::DepartmentHead)
            }
            AdminDashboard | AdminNotifications | AdminProfile | AdminAnalytics
            | AdminUserManagement => Access::OnlyRole(Role::DistrictMagistrate),
        }
    }

    /// Hardcoded "back" target per screen; there is no back-stack.
    pub fn back_target(self) -> Page {
        use Page::*;
        match self {
            Login | Register => Login,
            Dashboard => Dashboard,
            SubmitReport | History | MapView | Profile | Notifications | HelpCenter => Dashboard,
            FieldWorkerDashboard => FieldWorkerDashboard,
            FieldWorkerNotifications | FieldWorkerProfile => FieldWorkerDashboard,
            DepartmentHeadDashboard => DepartmentHeadDashboard,
            DepartmentHeadNotifications | DepartmentHeadProfile => DepartmentHeadDashboard,
            AdminDashboard => AdminDashboard,
            AdminNotifications | AdminProfile | AdminAnalytics | AdminUserManagement => {
                AdminDashboard
            }
        }
    }

    /// Where a freshly authenticated user lands.
    pub fn landing_for(role: Role) -> Page {
        match role {
            Role::Citizen => Page::Dashboard,
            Role::FieldWorker => Page::FieldWorkerDashboard,
            Role::DepartmentHead => Page::DepartmentHeadDashboard,
            Role::DistrictMagistrate => Page::AdminDashboard,
        }
    }

    pub fn slug(self) -> &'static str {
        use Page::*;
        match self {
            Login => "login",
            Register => "register",
            Dashboard => "dashboard",
            SubmitReport => "submit-report",
            History => "history",
            MapView => "map",
            Profile => "profile",
            Notifications => "notifications",
            HelpCenter => "help-center",
            FieldWorkerDashboard => "field-worker-dashboard",
            FieldWorkerNotifications => "field-worker-notifications",
            FieldWorkerProfile => "field-worker-profile",
            DepartmentHeadDashboard => "department-head-dashboard",
            DepartmentHeadNotifications => "department-head-notifications",
            DepartmentHeadProfile => "department-head-profile",
            AdminDashboard => "admin-dashboard",
            AdminNotifications => "admin-notifications",
            AdminProfile => "admin-profile",
            AdminAnalytics => "admin-analytics",
            AdminUserManagement => "admin-user-management",
        }
    }

    pub const ALL: [Page; 20] = [
        Page::Login,
        Page::Register,
        Page::Dashboard,
        Page::SubmitReport,
        Page::History,
        Page::MapView,
        Page::Profile,
        Page::Notifications,
        Page::HelpCenter,
        Page::FieldWorkerDashboard,
        Page::FieldWorkerNotifications,
        Page::FieldWorkerProfile,
        Page::DepartmentHeadDashboard,
        Page::DepartmentHeadNotifications,
        Page::DepartmentHeadProfile,
        Page::AdminDashboard,
        Page::AdminNotifications,
        Page::AdminProfile,
        Page::AdminAnalytics,
        Page::AdminUserManagement,
    ];

    pub fn from_slug(slug: &str) -> Option<Page> {
        Page::ALL.iter().copied().find(|p| p.slug() == slug)
    }
}

impl std::fmt::Display for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

/// What the selector hands to the rendering layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Screen(Page),
    /// The current page exists but the current user may not view it.
    Unauthorized(Page),
}

/// Pure function of (page, user); no hidden state, same inputs same view.
pub fn select_view(page: Page, user: Option<&User>) -> View {
    if page.required_access().permits(user) {
        View::Screen(page)
    } else {
        View::Unauthorized(page)
    }
}
