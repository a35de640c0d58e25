//! Reusable component boundaries.
//!
//! Each component declares a fixed sub-graph under its own logical name
//! and exposes a fixed set of outputs. Options passed to a component, such
//! as `protect`, reach every declaration inside it.

pub mod frontend;
pub mod server_network;

pub use frontend::{FrontendArgs, FrontendOutputs, frontend};
pub use server_network::{ServerNetworkArgs, ServerNetworkOutputs, server_network};
