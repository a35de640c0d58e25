//! Generated passwords.

use azcompose_core::{Output, PropertyMap, ResourceKind};

/// Arguments for a generated password.
#[derive(Debug, Clone)]
pub struct RandomPasswordArgs {
    length: u32,
    special: bool,
    override_special: Option<String>,
}

impl RandomPasswordArgs {
    /// A password of `length` characters without special characters.
    #[must_use]
    pub const fn new(length: u32) -> Self {
        Self {
            length,
            special: false,
            override_special: None,
        }
    }

    /// Includes special characters.
    #[must_use]
    pub const fn special(mut self, special: bool) -> Self {
        self.special = special;
        self
    }

    /// Restricts special characters to this set (`@_#`).
    #[must_use]
    pub fn override_special(mut self, characters: impl Into<String>) -> Self {
        self.override_special = Some(characters.into());
        self.special = true;
        self
    }
}

impl ResourceKind for RandomPasswordArgs {
    type Handle = RandomPassword;
    const TYPE: &'static str = "random:index/randomPassword:RandomPassword";
    const SECRET_OUTPUTS: &'static [&'static str] = &["result"];

    fn into_properties(self) -> PropertyMap {
        PropertyMap::new()
            .with("length", self.length)
            .with("special", self.special)
            .with_optional("overrideSpecial", self.override_special)
    }
}

resource_handle! {
    /// A declared generated password.
    RandomPassword
}

impl RandomPassword {
    /// The generated password. Always secret.
    #[must_use]
    pub fn result(&self) -> Output<String> {
        self.0.output("result")
    }
}

#[cfg(test)]
mod tests {
    use azcompose_common::config::StackSettings;
    use azcompose_core::{ResourceOptions, Stack};

    use super::*;

    #[test]
    fn result_is_secret_by_default() {
        let mut stack = Stack::new(StackSettings::new("t", "dev"));
        let pw = stack
            .declare("pw", RandomPasswordArgs::new(20).special(true), ResourceOptions::new())
            .unwrap();
        assert!(pw.result().is_secret());
        assert!(!pw.id().is_secret());
    }
}
