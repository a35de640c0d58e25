//! Workspace-wide constants and defaults.

/// Stack name used when a stack file does not name one.
pub const DEFAULT_STACK: &str = "dev";

/// Stack settings file looked up in the working directory.
pub const DEFAULT_STACK_FILE: &str = "stack.yaml";

/// Prefix of every resource URN.
pub const URN_PREFIX: &str = "urn:azc";

/// Separator between URN segments.
pub const URN_SEPARATOR: &str = "::";

/// Separator between a config namespace and its key (`project:key`).
pub const CONFIG_NAMESPACE_SEPARATOR: char = ':';

/// Separator inserted between a component name and a child's logical name.
pub const CHILD_NAME_SEPARATOR: char = '-';

/// Separator between ancestor type tokens in a child URN.
pub const URN_TYPE_SEPARATOR: char = '$';

/// Separator between ancestor logical names in a child URN.
pub const URN_PATH_SEPARATOR: char = '/';

/// Type-token prefix of explicit provider instances (`azc:providers:kubernetes`).
pub const PROVIDER_TYPE_PREFIX: &str = "azc:providers:";

/// Placeholder printed instead of a secret value.
pub const SECRET_MARKER: &str = "[secret]";

/// Binary name for the CLI.
pub const BIN_NAME: &str = "azc";
