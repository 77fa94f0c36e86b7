//! Redacting wrapper for personal data such as assignee e-mail addresses

use std::fmt;

const REDACTED: &str = "***REDACTED***";

/// Hides its contents from `Debug` and `Display`
///
/// ```
/// use storymap_core_types::Sensitive;
///
/// let email = Sensitive::new("dev@example.com");
/// assert_eq!(format!("{:?}", email), "***REDACTED***");
/// assert_eq!(email.expose(), &"dev@example.com");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Sensitive<T>(T);

impl<T> Sensitive<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Access the wrapped value; never pass the result to a log macro
    pub fn expose(&self) -> &T {
        &self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Debug for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl<T> fmt::Display for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}
