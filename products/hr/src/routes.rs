use std::{fmt, str::FromStr, sync::Arc};

use entity::EmployeeId;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error("no route matches {0}")]
    Unknown(String),
    #[error("invalid employee id in {0}")]
    InvalidId(String),
}

/// Client-side screens of the employee app.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    List,
    Create,
    UpdateEmployee(EmployeeId),
    EmployeeDetails(EmployeeId),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::List => "/list".to_string(),
            Route::Create => "/create".to_string(),
            Route::UpdateEmployee(id) => format!("/update-employee/{id}"),
            Route::EmployeeDetails(id) => format!("/employee-details/{id}"),
        }
    }

    /// Parses a path; the empty path redirects to [`Route::List`].
    pub fn parse(path: &str) -> Result<Self, RouteError> {
        let trimmed = path.trim().trim_matches('/');
        let segments: Vec<&str> = trimmed.split('/').collect();
        match segments.as_slice() {
            [""] | ["list"] => Ok(Route::List),
            ["create"] => Ok(Route::Create),
            ["update-employee", id] => parse_id(path, id).map(Route::UpdateEmployee),
            ["employee-details", id] => parse_id(path, id).map(Route::EmployeeDetails),
            _ => Err(RouteError::Unknown(path.to_string())),
        }
    }
}

fn parse_id(path: &str, raw: &str) -> Result<EmployeeId, RouteError> {
    raw.parse()
        .map_err(|_| RouteError::InvalidId(path.to_string()))
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

impl FromStr for Route {
    type Err = RouteError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Route::parse(value)
    }
}

/// Host-side route changes (router, CLI, test recorder).
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

impl<N: Navigator + ?Sized> Navigator for Arc<N> {
    fn navigate(&self, route: Route) {
        (**self).navigate(route)
    }
}

impl<N: Navigator + ?Sized> Navigator for &N {
    fn navigate(&self, route: Route) {
        (**self).navigate(route)
    }
}
