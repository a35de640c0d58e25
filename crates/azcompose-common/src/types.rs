//! Identifier types used across the azcompose workspace.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{
    CHILD_NAME_SEPARATOR, URN_PATH_SEPARATOR, URN_PREFIX, URN_SEPARATOR, URN_TYPE_SEPARATOR,
};

/// Logical name of a declaration, unique within a stack.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResourceName(String);

impl ResourceName {
    /// Creates a logical name from a string value.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the inner string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Provider type token in `package:module:Kind` form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TypeToken(String);

impl TypeToken {
    /// Creates a type token from a string value.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the inner string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the package segment (`azure-native` in `azure-native:cdn:Profile`).
    #[must_use]
    pub fn package(&self) -> &str {
        self.0.split(':').next().unwrap_or_default()
    }
}

impl fmt::Display for TypeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Globally unique identifier of a declaration within a stack.
///
/// Rendered as `urn:azc:<stack>::<project>::<type>::<name>`. Children of a
/// component carry the ancestor chain in both trailing segments:
/// `<parent type>$<type>` and `<parent name>/<name>`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Urn(String);

impl Urn {
    /// Builds the URN of a declaration.
    #[must_use]
    pub fn new(stack: &str, project: &str, type_token: &TypeToken, name: &ResourceName) -> Self {
        Self(format!(
            "{URN_PREFIX}:{stack}{URN_SEPARATOR}{project}{URN_SEPARATOR}{type_token}{URN_SEPARATOR}{name}"
        ))
    }

    /// Returns the inner string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Builds the URN of a declaration nested under `self`.
    #[must_use]
    pub fn child(&self, type_token: &TypeToken, name: &str) -> Self {
        let mut segments = self.0.rsplitn(3, URN_SEPARATOR);
        let parent_name = segments.next().unwrap_or_default();
        let parent_type = segments.next().unwrap_or_default();
        let head = segments.next().unwrap_or_default();
        Self(format!(
            "{head}{URN_SEPARATOR}{parent_type}{URN_TYPE_SEPARATOR}{type_token}\
             {URN_SEPARATOR}{parent_name}{URN_PATH_SEPARATOR}{name}"
        ))
    }

    /// Returns the trailing logical-name path (`web/cdn`).
    #[must_use]
    pub fn path(&self) -> &str {
        self.0.rsplit(URN_SEPARATOR).next().unwrap_or_default()
    }

    /// Returns the display name: the logical-name path joined with `-`.
    #[must_use]
    pub fn name(&self) -> String {
        self.path().replace(URN_PATH_SEPARATOR, &CHILD_NAME_SEPARATOR.to_string())
    }
}

impl fmt::Display for Urn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Name of a stack output.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ExportName(String);

impl ExportName {
    /// Creates an export name from a string value.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the inner string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExportName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urn_renders_all_segments() {
        let urn = Urn::new(
            "dev",
            "webapp",
            &TypeToken::new("azure-native:resources:ResourceGroup"),
            &ResourceName::new("rg"),
        );
        assert_eq!(
            urn.as_str(),
            "urn:azc:dev::webapp::azure-native:resources:ResourceGroup::rg"
        );
        assert_eq!(urn.name(), "rg");
    }

    #[test]
    fn child_urns_carry_the_ancestor_chain() {
        let web = Urn::new(
            "dev",
            "webapp",
            &TypeToken::new("azc:cdn:Frontend"),
            &ResourceName::new("web"),
        );
        let profile = web.child(&TypeToken::new("azure-native:cdn:Profile"), "profile");
        assert_eq!(
            profile.as_str(),
            "urn:azc:dev::webapp::azc:cdn:Frontend$azure-native:cdn:Profile::web/profile"
        );
        assert_eq!(profile.path(), "web/profile");
        assert_eq!(profile.name(), "web-profile");
    }

    #[test]
    fn equal_display_names_keep_distinct_urns() {
        let kind = TypeToken::new("azc:test:Group");
        let leaf = TypeToken::new("t:m:K");
        let blue = Urn::new("dev", "p", &kind, &ResourceName::new("blue"));
        let blue_x = Urn::new("dev", "p", &kind, &ResourceName::new("blue-x"));
        let a = blue.child(&leaf, "x-y");
        let b = blue_x.child(&leaf, "y");
        assert_eq!(a.name(), b.name());
        assert_ne!(a, b);
    }

    #[test]
    fn type_token_package() {
        let token = TypeToken::new("azure-native:cdn:Profile");
        assert_eq!(token.package(), "azure-native");
    }
}
