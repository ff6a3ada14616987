/// JWT Token Generation and Validation
///
/// Access tokens are HS256-signed and stateless. Validity is re-derived from
/// the signature and `exp` on every request, so an issued token cannot be
/// revoked; it simply runs out.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::claims::Claims;
use crate::configuration::JwtSettings;
use crate::error::TokenError;

/// Signs and verifies access tokens with one fixed secret
#[derive(Clone)]
pub struct AccessTokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
}

impl AccessTokenCodec {
    pub fn new(secret: &str, issuer: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.to_string(),
        }
    }

    pub fn from_settings(config: &JwtSettings) -> Self {
        Self::new(&config.secret, &config.issuer)
    }

    /// Issue a token for `user_id` valid for `ttl_seconds`
    ///
    /// # Errors
    /// Returns `TokenError::Signing` if encoding fails
    pub fn issue(&self, user_id: Uuid, ttl_seconds: i64) -> Result<String, TokenError> {
        let claims = Claims::new(user_id, ttl_seconds, &self.issuer)?;

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify signature, issuer and expiry, returning the raw claims
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                let err = classify(&e);
                tracing::debug!(error = %e, kind = ?err, "JWT validation error");
                err
            })?;

        // jsonwebtoken still accepts a token in the second where exp == now.
        if claims.is_expired() {
            tracing::debug!(exp = claims.exp, "JWT expired");
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    /// Validate a token and return the account id it was issued for
    ///
    /// # Errors
    /// - `InvalidSignature` when the token was not signed with our secret
    /// - `Expired` once `exp` has passed
    /// - `Malformed` when it is not a well-formed claim set
    /// - `SubjectUnparseable` when `sub` is not a UUID
    pub fn validate(&self, token: &str) -> Result<Uuid, TokenError> {
        self.decode(token)?.user_id()
    }
}

fn classify(err: &jsonwebtoken::errors::Error) -> TokenError {
    match err.kind() {
        ErrorKind::InvalidSignature => TokenError::InvalidSignature,
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Malformed(err.to_string()),
    }
}
