//! # azcompose-azure
//!
//! Typed builders for the Azure resource kinds the built-in programs use,
//! the reusable [`components`], and the [`programs`] themselves.
//!
//! Property names and enum values are spelled exactly as the provider
//! schema spells them; a builder only exposes setters for properties the
//! schema defines.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used, clippy::panic))]

/// Declares a typed handle wrapping an untyped [`Resource`].
///
/// [`Resource`]: azcompose_core::Resource
macro_rules! resource_handle {
    ($(#[$meta:meta])* $handle:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $handle(::azcompose_core::Resource);

        impl From<::azcompose_core::Resource> for $handle {
            fn from(resource: ::azcompose_core::Resource) -> Self {
                Self(resource)
            }
        }

        impl ::azcompose_core::Handle for $handle {
            fn urn(&self) -> &::azcompose_common::types::Urn {
                ::azcompose_core::Handle::urn(&self.0)
            }

            fn type_token(&self) -> &::azcompose_common::types::TypeToken {
                ::azcompose_core::Handle::type_token(&self.0)
            }
        }

        impl $handle {
            /// Provider-assigned identifier.
            #[must_use]
            pub fn id(&self) -> ::azcompose_core::Output<String> {
                self.0.id()
            }

            /// Physical name assigned at deployment time.
            #[must_use]
            pub fn name(&self) -> ::azcompose_core::Output<String> {
                self.0.name()
            }

            /// The untyped handle, for attributes without a typed getter.
            #[must_use]
            pub const fn resource(&self) -> &::azcompose_core::Resource {
                &self.0
            }
        }
    };
}

/// Declares an enum whose values are spelled as the provider schema
/// spells them.
macro_rules! schema_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $wire:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// The value as the provider schema spells it.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire),+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl From<$name> for ::azcompose_core::PropertyValue {
            fn from(value: $name) -> Self {
                Self::from(value.as_str())
            }
        }
    };
}

pub mod azuread;
pub mod cdn;
pub mod components;
pub mod compute;
pub mod containerservice;
pub mod cosmosdb;
pub mod kubernetes;
pub mod logic;
pub mod network;
pub mod programs;
pub mod random;
pub mod resources;
pub mod storage;
pub mod tls;
