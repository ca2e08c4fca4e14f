//! Client for the authentication backend
//!
//! The backend exposes session routes under `/api/auth` and keeps the
//! signed-in user in a cookie, so the underlying reqwest client carries a
//! cookie store. The chat side only consumes the resulting [`Identity`].

use crate::config::AuthConfig;
use crate::error::{HookchatError, Result};

use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

/// Path prefix of every auth route
pub const AUTH_PREFIX: &str = "api/auth/";

/// The signed-in user
///
/// Only `uid` matters to session storage; it namespaces every stored key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    #[serde(alias = "_id")]
    pub uid: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
}

impl Identity {
    /// Identity known only by its uid, used for offline commands
    pub fn local(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            full_name: String::new(),
            email: String::new(),
        }
    }

    /// Name to greet the user with
    pub fn display_name(&self) -> &str {
        if !self.full_name.is_empty() {
            &self.full_name
        } else if !self.email.is_empty() {
            &self.email
        } else {
            &self.uid
        }
    }
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignupRequest<'a> {
    full_name: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// HTTP client for the auth backend
pub struct AuthClient {
    client: Client,
    base: Url,
}

impl AuthClient {
    /// Create a client for the configured backend
    ///
    /// # Errors
    ///
    /// Returns error if the base URL is invalid or the HTTP client cannot be built
    pub fn new(config: &AuthConfig) -> Result<Self> {
        let mut base = config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base = Url::parse(&base)
            .map_err(|e| HookchatError::Config(format!("Invalid auth base URL: {}", e)))?;

        let client = Client::builder()
            .cookie_store(true)
            .user_agent(concat!("hookchat/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                HookchatError::Authentication(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self { client, base })
    }

    fn endpoint(&self, route: &str) -> Result<Url> {
        let url = self
            .base
            .join(AUTH_PREFIX)
            .and_then(|prefix| prefix.join(route))
            .map_err(|e| HookchatError::Config(format!("Invalid auth route {}: {}", route, e)))?;
        Ok(url)
    }

    /// Identity of the current backend session, `None` when signed out
    pub async fn check(&self) -> Result<Option<Identity>> {
        let response = self
            .client
            .get(self.endpoint("check")?)
            .send()
            .await
            .map_err(HookchatError::from)?;

        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            tracing::debug!(status = %response.status(), "No active auth session");
            return Ok(None);
        }

        identity_from(response).await.map(Some)
    }

    /// Sign in with email and password
    pub async fn login(&self, email: &str, password: &str) -> Result<Identity> {
        let response = self
            .client
            .post(self.endpoint("login")?)
            .json(&LoginRequest { email, password })
            .send()
            .await
            .map_err(HookchatError::from)?;

        let identity = identity_from(response).await?;
        tracing::info!(identity = %identity.uid, "Logged in");
        Ok(identity)
    }

    /// Create an account; the backend signs the new user in
    pub async fn signup(&self, full_name: &str, email: &str, password: &str) -> Result<Identity> {
        let response = self
            .client
            .post(self.endpoint("signup")?)
            .json(&SignupRequest {
                full_name,
                email,
                password,
            })
            .send()
            .await
            .map_err(HookchatError::from)?;

        let identity = identity_from(response).await?;
        tracing::info!(identity = %identity.uid, "Signed up");
        Ok(identity)
    }

    /// End the backend session
    pub async fn logout(&self) -> Result<()> {
        let response = self
            .client
            .post(self.endpoint("logout")?)
            .send()
            .await
            .map_err(HookchatError::from)?;
        if !response.status().is_success() {
            return Err(rejection(response).await.into());
        }
        tracing::info!("Logged out");
        Ok(())
    }
}

async fn identity_from(response: Response) -> Result<Identity> {
    if !response.status().is_success() {
        return Err(rejection(response).await.into());
    }
    Ok(response.json::<Identity>().await.map_err(HookchatError::from)?)
}

async fn rejection(response: Response) -> HookchatError {
    let status = response.status();
    let message = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.message)
        .unwrap_or_else(|| format!("auth backend returned {}", status));
    HookchatError::Authentication(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_accepts_mongo_style_id() {
        let json = r#"{"_id":"65f0c1","fullName":"Ada Lovelace","email":"ada@example.com","profilePic":""}"#;
        let identity: Identity = serde_json::from_str(json).unwrap();
        assert_eq!(identity.uid, "65f0c1");
        assert_eq!(identity.full_name, "Ada Lovelace");
    }

    #[test]
    fn test_identity_display_name_fallbacks() {
        let mut identity = Identity::local("u1");
        assert_eq!(identity.display_name(), "u1");
        identity.email = "a@b.c".to_string();
        assert_eq!(identity.display_name(), "a@b.c");
        identity.full_name = "Ada".to_string();
        assert_eq!(identity.display_name(), "Ada");
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = AuthClient::new(&AuthConfig {
            base_url: "http://example.com/backend".to_string(),
        })
        .unwrap();
        assert_eq!(
            client.endpoint("login").unwrap().as_str(),
            "http://example.com/backend/api/auth/login"
        );
    }

    #[test]
    fn test_new_rejects_invalid_base_url() {
        let result = AuthClient::new(&AuthConfig {
            base_url: "not a url".to_string(),
        });
        assert!(result.is_err());
    }
}
