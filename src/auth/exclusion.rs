//! Paths that skip authentication.

/// Paths excluded out of the box: the welcome page, status checks, the login
/// form, registration, the reset-password flow and the user-bound session
/// endpoints, which check their own `session_id` cookie.
pub const DEFAULT_EXCLUDED_PATHS: &[&str] = &[
    "/",
    "/api/v1/status/",
    "/api/v1/unauthorized/",
    "/api/v1/forbidden/",
    "/api/v1/auth_session/login/",
    "/api/v1/users/",
    "/api/v1/reset_password/",
    "/api/v1/sessions/",
    "/api/v1/profile/",
    "/health/",
];

const WILDCARD: char = '*';

/// Exclusion list. Entries ending in `*` match by prefix, all others must equal
/// the request path after it has been normalised to end in `/`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExcludedPaths(Vec<String>);

impl ExcludedPaths {
    #[must_use]
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(entries.into_iter().map(Into::into).collect())
    }

    /// Parse a comma separated list, skipping blank entries.
    #[must_use]
    pub fn parse(csv: &str) -> Self {
        Self::new(
            csv.split(',')
                .map(str::trim)
                .filter(|entry| !entry.is_empty()),
        )
    }

    #[must_use]
    pub fn defaults() -> Self {
        Self::new(DEFAULT_EXCLUDED_PATHS.iter().copied())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.0
    }

    /// Decide whether `path` needs authentication.
    ///
    /// An empty list requires nothing.
    #[must_use]
    pub fn require_auth(&self, path: &str) -> bool {
        if self.0.is_empty() {
            return false;
        }
        let normalized = if path.ends_with('/') {
            path.to_string()
        } else {
            format!("{path}/")
        };
        !self.0.iter().any(|entry| match entry.strip_suffix(WILDCARD) {
            Some(prefix) => normalized.starts_with(prefix),
            None => *entry == normalized,
        })
    }
}
