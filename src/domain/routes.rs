use crate::domain::identity::Role;

/// Every view the portal can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    // Public.
    Home,
    Login,
    Register,

    // Any signed-in account.
    Dashboard,
    NewRequest,
    Requests,
    TrackImpact,
    ViewProgress,
    Certificate,
    Reports,
    ProfileSettings,

    // Admin.
    AdminDashboard,
    AdminRequests,
    AdminPickupPersons,
    AdminUsers,
    AdminReports,
    AdminTickets,
    AdminSettings,

    // Pickup person.
    PickupDashboard,
    PickupAssignments,
    PickupSchedule,
    PickupRoute,
    PickupCompleted,
    PickupPerformance,
    PickupReports,
    PickupSettings,
}

/// Who may open a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    Public,
    SignedIn,
    Only(Role),
}

impl Route {
    pub const ALL: [Route; 26] = [
        Route::Home,
        Route::Login,
        Route::Register,
        Route::Dashboard,
        Route::NewRequest,
        Route::Requests,
        Route::TrackImpact,
        Route::ViewProgress,
        Route::Certificate,
        Route::Reports,
        Route::ProfileSettings,
        Route::AdminDashboard,
        Route::AdminRequests,
        Route::AdminPickupPersons,
        Route::AdminUsers,
        Route::AdminReports,
        Route::AdminTickets,
        Route::AdminSettings,
        Route::PickupDashboard,
        Route::PickupAssignments,
        Route::PickupSchedule,
        Route::PickupRoute,
        Route::PickupCompleted,
        Route::PickupPerformance,
        Route::PickupReports,
        Route::PickupSettings,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Dashboard => "/dashboard",
            Route::NewRequest => "/new-request",
            Route::Requests => "/requests",
            Route::TrackImpact => "/track-impact",
            Route::ViewProgress => "/view-progress",
            Route::Certificate => "/certificate",
            Route::Reports => "/reports",
            Route::ProfileSettings => "/profile/settings",
            Route::AdminDashboard => "/admin",
            Route::AdminRequests => "/admin/requests",
            Route::AdminPickupPersons => "/admin/pickup-persons",
            Route::AdminUsers => "/admin/users",
            Route::AdminReports => "/admin/reports",
            Route::AdminTickets => "/admin/tickets",
            Route::AdminSettings => "/admin/settings",
            Route::PickupDashboard => "/pickup-person",
            Route::PickupAssignments => "/pickup-person/assignments",
            Route::PickupSchedule => "/pickup-person/schedule",
            Route::PickupRoute => "/pickup-person/route",
            Route::PickupCompleted => "/pickup-person/completed",
            Route::PickupPerformance => "/pickup-person/performance",
            Route::PickupReports => "/pickup-person/reports",
            Route::PickupSettings => "/pickup-person/settings",
        }
    }

    /// Exact path lookup; a trailing slash is tolerated.
    pub fn from_path(path: &str) -> Option<Route> {
        let trimmed = match path.trim_end_matches('/') {
            "" => "/",
            other => other,
        };
        Route::ALL.into_iter().find(|route| route.path() == trimmed)
    }

    pub fn audience(self) -> Audience {
        match self {
            Route::Home | Route::Login | Route::Register => Audience::Public,
            Route::Dashboard
            | Route::NewRequest
            | Route::Requests
            | Route::TrackImpact
            | Route::ViewProgress
            | Route::Certificate
            | Route::Reports
            | Route::ProfileSettings => Audience::SignedIn,
            Route::AdminDashboard
            | Route::AdminRequests
            | Route::AdminPickupPersons
            | Route::AdminUsers
            | Route::AdminReports
            | Route::AdminTickets
            | Route::AdminSettings => Audience::Only(Role::Admin),
            Route::PickupDashboard
            | Route::PickupAssignments
            | Route::PickupSchedule
            | Route::PickupRoute
            | Route::PickupCompleted
            | Route::PickupPerformance
            | Route::PickupReports
            | Route::PickupSettings => Audience::Only(Role::PickupPerson),
        }
    }
}
