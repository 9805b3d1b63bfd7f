// Central role -> destination mapping. Every redirect decision goes through here.

use crate::domain::{Audience, Identity, Role, Route};

/// Home route of a role.
pub fn role_home(role: Role) -> Route {
    match role {
        Role::Admin => Route::AdminDashboard,
        Role::PickupPerson => Route::PickupDashboard,
        Role::User => Route::Dashboard,
    }
}

/// Where an identity lands after sign-in or when following a top-level link.
pub fn landing_route(identity: Option<&Identity>) -> Route {
    match identity {
        Some(identity) => role_home(identity.role()),
        None => Route::Login,
    }
}

/// Result of a route guard check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted(Route),
    Redirect(Route),
}

impl Access {
    /// The route the shell should end up showing.
    pub fn destination(self) -> Route {
        match self {
            Access::Granted(route) | Access::Redirect(route) => route,
        }
    }
}

/// Gates a route for the current identity.
pub fn authorize(route: Route, identity: Option<&Identity>) -> Access {
    match (route.audience(), identity) {
        (Audience::Public, _) => Access::Granted(route),
        (_, None) => Access::Redirect(Route::Login),
        (Audience::SignedIn, Some(_)) => Access::Granted(route),
        (Audience::Only(required), Some(identity)) if identity.role() == required => {
            Access::Granted(route)
        }
        (Audience::Only(_), Some(identity)) => Access::Redirect(landing_route(Some(identity))),
    }
}

/// Resolves a raw path for the current identity, including unknown paths.
pub fn resolve(path: &str, identity: Option<&Identity>) -> Access {
    match Route::from_path(path) {
        Some(route) => authorize(route, identity),
        None => match identity {
            Some(_) => Access::Redirect(landing_route(identity)),
            None => Access::Redirect(Route::Home),
        },
    }
}
