//! Unified error taxonomy for the azcompose workspace.
//!
//! Composition-time errors (name collisions, missing configuration, secret
//! leaks) abort before anything is handed to an engine. Engine-side errors
//! (`Unresolved`, `Provider`) are only produced while a composition is
//! being evaluated against provisioned state.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// A logical name was registered twice.
    #[error("{kind} name collision: \"{name}\" is already declared")]
    NameCollision {
        /// What collided (`resource`, `component`, `export`).
        kind: &'static str,
        /// The duplicated name.
        name: String,
    },

    /// A required configuration key has no value and no default.
    #[error("missing required configuration value: {key}")]
    MissingConfig {
        /// Fully qualified config key.
        key: String,
    },

    /// A configuration value could not be read as the requested type.
    #[error("invalid configuration value for {key}: {message}")]
    InvalidConfig {
        /// Fully qualified config key.
        key: String,
        /// Description of the problem.
        message: String,
    },

    /// A secret value would have been exposed as plaintext.
    #[error("secret leak: {context}")]
    SecretLeak {
        /// Where the secret would have leaked.
        context: String,
    },

    /// A property value could not be lowered into the declaration.
    #[error("invalid property: {context}")]
    InvalidProperty {
        /// Which property failed and why.
        context: String,
    },

    /// The declaration graph contains a cycle.
    #[error("cyclic dependency: {message}")]
    CyclicDependency {
        /// Description of the cycle.
        message: String,
    },

    /// A handle refers to a resource that this composition never declared.
    #[error("unknown resource reference: {name}")]
    UnknownResource {
        /// URN or name of the unknown resource.
        name: String,
    },

    /// A deferred output was evaluated before its input was available.
    #[error("output of {resource} is not resolved yet (attribute \"{attribute}\")")]
    Unresolved {
        /// URN of the resource the attribute belongs to.
        resource: String,
        /// Attribute path that is missing.
        attribute: String,
    },

    /// The provider rejected or failed a resource operation.
    #[error("provider error for {resource}: {message}")]
    Provider {
        /// URN of the failing resource.
        resource: String,
        /// Provider message, passed through verbatim.
        message: String,
    },

    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// JSON serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },

    /// A YAML stack file could not be parsed.
    #[error("stack file error: {source}")]
    Yaml {
        /// Underlying YAML error.
        #[from]
        source: serde_yaml::Error,
    },
}

impl ComposeError {
    /// Shorthand for a [`ComposeError::SecretLeak`].
    pub fn secret_leak(context: impl Into<String>) -> Self {
        Self::SecretLeak {
            context: context.into(),
        }
    }

    /// Returns `true` for errors raised while building the composition,
    /// before any engine involvement.
    #[must_use]
    pub const fn is_composition_error(&self) -> bool {
        matches!(
            self,
            Self::NameCollision { .. }
                | Self::MissingConfig { .. }
                | Self::InvalidConfig { .. }
                | Self::SecretLeak { .. }
                | Self::InvalidProperty { .. }
                | Self::UnknownResource { .. }
        )
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, ComposeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collision_message_names_kind_and_name() {
        let err = ComposeError::NameCollision {
            kind: "resource",
            name: "rg".into(),
        };
        assert_eq!(
            err.to_string(),
            "resource name collision: \"rg\" is already declared"
        );
    }

    #[test]
    fn composition_errors_are_classified() {
        assert!(ComposeError::secret_leak("export pw").is_composition_error());
        assert!(
            ComposeError::MissingConfig {
                key: "app:base_name".into()
            }
            .is_composition_error()
        );
        assert!(
            !ComposeError::Provider {
                resource: "urn".into(),
                message: "quota exceeded".into(),
            }
            .is_composition_error()
        );
    }
}
