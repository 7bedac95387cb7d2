// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! OAuth 2.0 access tokens for service accounts.
//!
//! Google exchanges a self-signed JWT assertion for a short-lived bearer
//! token. See <https://developers.google.com/identity/protocols/oauth2/service-account>.

use {
    crate::{AndroidPublisherClient, ApiError, AuthError, PublisherError},
    jsonwebtoken::{Algorithm, EncodingKey, Header},
    serde::{Deserialize, Serialize},
    std::time::{Duration, Instant, SystemTime},
};

/// OAuth scope granting access to the publisher API.
pub const ANDROID_PUBLISHER_SCOPE: &str = "https://www.googleapis.com/auth/androidpublisher";

const JWT_BEARER_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Google refuses assertions valid for longer than an hour.
const ASSERTION_LIFETIME_SECS: u64 = 3600;

/// Tokens this close to expiring are replaced rather than sent.
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

#[derive(Clone, Debug, Deserialize, Serialize)]
struct AssertionClaims {
    iss: String,
    scope: String,
    aud: String,
    iat: u64,
    exp: u64,
}

#[derive(Clone, Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
    #[serde(default)]
    token_type: Option<String>,
}

fn default_expires_in() -> u64 {
    ASSERTION_LIFETIME_SECS
}

/// A bearer token and the moment it stops being accepted.
#[derive(Clone)]
pub struct AccessToken {
    value: String,
    expires_at: Instant,
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl AccessToken {
    pub fn new(value: String, lifetime: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now() + lifetime,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Whether the token can still be sent with a request.
    pub fn is_usable(&self) -> bool {
        Instant::now() + REFRESH_MARGIN < self.expires_at
    }
}

/// Signs token assertions on behalf of a service account.
///
/// Holds the account identity, the endpoint tokens are minted by and the
/// RSA key assertions are signed with. Usually obtained from a
/// [crate::ServiceAccountKey] via [TryFrom].
#[derive(Clone)]
pub struct TokenEncoder {
    client_email: String,
    key_id: Option<String>,
    token_uri: String,
    encoding_key: EncodingKey,
}

impl TokenEncoder {
    /// Construct an instance from an [EncodingKey] instance.
    pub fn from_jwt_encoding_key(
        client_email: String,
        key_id: Option<String>,
        token_uri: String,
        encoding_key: EncodingKey,
    ) -> Self {
        Self {
            client_email,
            key_id,
            token_uri,
            encoding_key,
        }
    }

    /// Construct an instance from a PEM encoded RSA private key.
    pub fn from_rsa_pem(
        client_email: String,
        key_id: Option<String>,
        token_uri: String,
        pem_data: &[u8],
    ) -> Result<Self, AuthError> {
        let encoding_key = EncodingKey::from_rsa_pem(pem_data).map_err(AuthError::Key)?;

        Ok(Self::from_jwt_encoding_key(
            client_email,
            key_id,
            token_uri,
            encoding_key,
        ))
    }

    pub fn client_email(&self) -> &str {
        &self.client_email
    }

    pub fn token_uri(&self) -> &str {
        &self.token_uri
    }

    /// Mint a signed assertion valid for `duration` seconds.
    pub fn new_assertion(&self, duration: u64) -> Result<String, AuthError> {
        let header = Header {
            kid: self.key_id.clone(),
            alg: Algorithm::RS256,
            ..Default::default()
        };

        let now = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .expect("calculating UNIX time should never fail")
            .as_secs();

        let claims = AssertionClaims {
            iss: self.client_email.clone(),
            scope: ANDROID_PUBLISHER_SCOPE.to_string(),
            aud: self.token_uri.clone(),
            iat: now,
            exp: now + duration,
        };

        jsonwebtoken::encode(&header, &claims, &self.encoding_key).map_err(AuthError::Key)
    }
}

impl AndroidPublisherClient {
    /// Exchange a fresh assertion for an access token.
    pub(crate) fn fetch_access_token(&self) -> Result<AccessToken, PublisherError> {
        let assertion = self.token_encoder.new_assertion(ASSERTION_LIFETIME_SECS)?;
        let url = self.token_encoder.token_uri().to_string();

        log::debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .form(&[
                ("grant_type", JWT_BEARER_GRANT_TYPE),
                ("assertion", assertion.as_str()),
            ])
            .send()?;

        let status = response.status();
        let body = response.bytes()?;

        if !status.is_success() {
            return Err(AuthError::TokenExchange {
                url,
                status: status.as_u16(),
                message: crate::describe_body(body.as_ref()),
            }
            .into());
        }

        let token: TokenResponse = serde_json::from_slice(body.as_ref())
            .map_err(|source| ApiError::Decode { url, source })?;

        if let Some(token_type) = &token.token_type {
            if !token_type.eq_ignore_ascii_case("bearer") {
                log::warn!("unexpected access token type: {}", token_type);
            }
        }

        log::debug!(
            "obtained access token for {} valid for {}s",
            self.token_encoder.client_email(),
            token.expires_in
        );

        Ok(AccessToken::new(
            token.access_token,
            Duration::from_secs(token.expires_in),
        ))
    }
}
