//! A resource group named from required configuration.

use azcompose_common::error::Result;
use azcompose_core::Stack;

use super::resource_group;

/// Requires `base_name`, declares `<base_name>-rg`, and exports the
/// group's physical name as `resource_group_name`.
///
/// # Errors
///
/// Returns [`azcompose_common::error::ComposeError::MissingConfig`] when
/// `base_name` is not set.
pub fn run(stack: &mut Stack) -> Result<()> {
    let base_name = stack.config().require("base_name")?;
    let rg = resource_group(stack, &format!("{base_name}-rg"))?;
    stack.export("resource_group_name", rg.name())
}
