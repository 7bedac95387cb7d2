// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Shared test fixtures.

use {
    crate::TokenEncoder,
    rsa::{
        pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding},
        RsaPrivateKey, RsaPublicKey,
    },
    std::sync::OnceLock,
};

pub const CLIENT_EMAIL: &str = "publisher@api-project-1234.iam.gserviceaccount.com";

/// A PEM encoded (private, public) RSA key pair.
///
/// Generating RSA keys is slow, so every test shares one.
pub fn rsa_key_pair() -> &'static (String, String) {
    static KEY: OnceLock<(String, String)> = OnceLock::new();

    KEY.get_or_init(|| {
        let private = RsaPrivateKey::new(&mut rand::rngs::OsRng, 2048).unwrap();
        let public = RsaPublicKey::from(&private);

        (
            private.to_pkcs8_pem(LineEnding::LF).unwrap().as_str().to_string(),
            public.to_public_key_pem(LineEnding::LF).unwrap(),
        )
    })
}

pub fn token_encoder(token_uri: &str) -> TokenEncoder {
    TokenEncoder::from_rsa_pem(
        CLIENT_EMAIL.to_string(),
        Some("0123456789abcdef".to_string()),
        token_uri.to_string(),
        rsa_key_pair().0.as_bytes(),
    )
    .unwrap()
}
