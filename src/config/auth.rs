//! Authentication configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;

/// HS256 session-token settings.
#[derive(Debug, Deserialize)]
pub struct AuthConfig {
    /// Shared secret the auth backend signs access tokens with
    pub jwt_secret: SecretString,

    /// Expected `aud` claim
    #[serde(default = "default_audience")]
    pub audience: String,

    /// Expected `iss` claim, if any
    pub issuer: Option<String>,

    /// Tolerated clock skew in seconds
    #[serde(default = "default_leeway")]
    pub leeway_secs: u64,
}

impl AuthConfig {
    /// In production the secret must be at least 32 bytes and a configured
    /// issuer must use HTTPS.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        let secret = self.jwt_secret.expose_secret();
        if secret.is_empty() {
            return Err(ValidationError::MissingRequired("AUTH__JWT_SECRET"));
        }
        if self.audience.trim().is_empty() {
            return Err(ValidationError::MissingRequired("AUTH__AUDIENCE"));
        }

        if *environment == Environment::Production {
            if secret.len() < 32 {
                return Err(ValidationError::JwtSecretTooShort);
            }
            if let Some(issuer) = &self.issuer {
                if !issuer.starts_with("https://") {
                    return Err(ValidationError::IssuerMustBeHttps);
                }
            }
        }

        Ok(())
    }
}

fn default_audience() -> String {
    "authenticated".to_string()
}

fn default_leeway() -> u64 {
    30
}
