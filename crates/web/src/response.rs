//! Response helpers.

use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

/// A `302 Found` redirect.
///
/// Browsers follow it with a GET, which is what every form submission on
/// the site expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Found(String);

impl Found {
    /// Redirect to `location`.
    #[must_use]
    pub fn to(location: impl Into<String>) -> Self {
        Self(location.into())
    }

    /// Target of the redirect.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.0
    }
}

impl IntoResponse for Found {
    fn into_response(self) -> Response {
        (StatusCode::FOUND, [(header::LOCATION, self.0)]).into_response()
    }
}
