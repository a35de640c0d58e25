//! Secret wrapper that keeps plaintext out of logs and listings.

use std::fmt;

use azcompose_common::constants::SECRET_MARKER;

/// A value that must never be rendered as plaintext.
///
/// `Debug` and `Display` print a redaction marker. Reading the value
/// requires the explicit [`Secret::expose`] opt-in. It does not implement
/// `Serialize`.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret<T>(T);

impl<T> Secret<T> {
    /// Wraps a value.
    pub const fn new(value: T) -> Self {
        Self(value)
    }

    /// Returns the plaintext value.
    pub const fn expose(&self) -> &T {
        &self.0
    }

    /// Unwraps into the plaintext value.
    pub fn into_exposed(self) -> T {
        self.0
    }

    /// Transforms the wrapped value, keeping it secret.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Secret<U> {
        Secret(f(self.0))
    }
}

impl<T> fmt::Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(SECRET_MARKER)
    }
}

impl<T> fmt::Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(SECRET_MARKER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_and_display_are_redacted() {
        let secret = Secret::new("hunter2".to_string());
        assert_eq!(format!("{secret:?}"), SECRET_MARKER);
        assert_eq!(secret.to_string(), SECRET_MARKER);
        assert_eq!(secret.expose(), "hunter2");
    }

    #[test]
    fn map_keeps_value_wrapped() {
        let secret = Secret::new(4).map(|n| n * 2);
        assert_eq!(*secret.expose(), 8);
    }
}
