//! Generated key pairs.

use azcompose_core::{Output, PropertyMap, ResourceKind};

schema_enum! {
    /// Key algorithm.
    Algorithm {
        /// RSA.
        Rsa => "RSA",
        /// Elliptic curve.
        Ecdsa => "ECDSA",
    }
}

/// Arguments for a generated private key.
#[derive(Debug, Clone)]
pub struct PrivateKeyArgs {
    algorithm: Algorithm,
    rsa_bits: Option<u32>,
}

impl PrivateKeyArgs {
    /// A key using `algorithm` with the provider's default size.
    #[must_use]
    pub const fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            rsa_bits: None,
        }
    }

    /// RSA key size.
    #[must_use]
    pub const fn rsa_bits(mut self, bits: u32) -> Self {
        self.rsa_bits = Some(bits);
        self
    }
}

impl ResourceKind for PrivateKeyArgs {
    type Handle = PrivateKey;
    const TYPE: &'static str = "tls:index/privateKey:PrivateKey";
    const SECRET_OUTPUTS: &'static [&'static str] = &["privateKeyPem", "privateKeyOpenssh"];

    fn into_properties(self) -> PropertyMap {
        PropertyMap::new()
            .with("algorithm", self.algorithm)
            .with_optional("rsaBits", self.rsa_bits)
    }
}

resource_handle! {
    /// A declared private key.
    PrivateKey
}

impl PrivateKey {
    /// Public half in OpenSSH `authorized_keys` format.
    #[must_use]
    pub fn public_key_openssh(&self) -> Output<String> {
        self.0.output("publicKeyOpenssh")
    }

    /// Private half in PEM format. Always secret.
    #[must_use]
    pub fn private_key_pem(&self) -> Output<String> {
        self.0.output("privateKeyPem")
    }
}

#[cfg(test)]
mod tests {
    use azcompose_common::config::StackSettings;
    use azcompose_core::{ResourceOptions, Stack};

    use super::*;

    #[test]
    fn only_the_private_half_is_secret() {
        let _ = Stack::run(StackSettings::new("t", "dev"), |stack| {
            let key = stack.declare(
                "key",
                PrivateKeyArgs::new(Algorithm::Rsa).rsa_bits(4096),
                ResourceOptions::new(),
            )?;
            assert!(key.private_key_pem().is_secret());
            assert!(!key.public_key_openssh().is_secret());
            Ok(())
        })
        .unwrap();
    }
}
