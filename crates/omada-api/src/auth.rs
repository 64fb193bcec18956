// Session credentials and login/logout
//
// Omada hands out a CSRF token in the login result; every later request
// must echo it in the `Csrf-Token` header alongside the session cookie.
// The token is owned by a `Session` value attached to one client. It is
// set at login, cleared at logout, and never stored anywhere global.

use std::sync::{PoisonError, RwLock};

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::client::OmadaClient;
use crate::error::Error;
use crate::models::CurrentUser;

/// Header carrying the session token on every authenticated request.
pub const HEADER_CSRF_TOKEN: &str = "Csrf-Token";

/// The current session token for one controller connection.
#[derive(Debug, Default)]
pub struct Session {
    token: RwLock<Option<SecretString>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub(crate) fn set(&self, token: SecretString) {
        debug!("storing session token");
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
    }

    pub(crate) fn clear(&self) {
        debug!("clearing session token");
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Attach the token header, if a session is active.
    pub(crate) fn apply(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let guard = self.token.read().unwrap_or_else(PoisonError::into_inner);
        match guard.as_ref() {
            Some(token) => builder.header(HEADER_CSRF_TOKEN, token.expose_secret()),
            None => builder,
        }
    }
}

#[derive(Deserialize)]
struct LoginResult {
    token: Option<String>,
}

#[derive(Deserialize)]
struct LoginStatus {
    #[serde(default)]
    login: bool,
}

impl OmadaClient {
    /// Authenticate with username/password.
    ///
    /// `POST /login`. On success the returned token becomes this client's
    /// session token; the session cookie lands in the cookie jar.
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<(), Error> {
        debug!(username, "logging in");

        let body = json!({
            "username": username,
            "password": password.expose_secret(),
        });
        let result: LoginResult = self.post_as("/login", Some(&body)).await?;

        let token = result
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::Authentication {
                message: "login response did not contain a token".into(),
            })?;
        self.session().set(SecretString::from(token));

        debug!("login successful");
        Ok(())
    }

    /// End the current session.
    ///
    /// `POST /logout`. The local token is dropped even if the controller
    /// rejects the call.
    pub async fn logout(&self) -> Result<(), Error> {
        let result = self.post("/logout", None).await;
        self.session().clear();
        result.map(|_| ())
    }

    /// Whether the controller still considers this client logged in.
    ///
    /// `GET /loginStatus`. A logged-out client gets redirected to the HTML
    /// login page instead of a JSON answer, which reads as `false`.
    pub async fn is_logged_in(&self) -> Result<bool, Error> {
        match self.get_as::<LoginStatus>("/loginStatus", &[]).await {
            Ok(status) => Ok(status.login),
            Err(e) if e.is_not_json() => {
                debug!("login status probe returned non-JSON, treating as logged out");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// `GET /users/current`
    pub async fn get_current_user(&self) -> Result<CurrentUser, Error> {
        self.get_as("/users/current", &[]).await
    }
}
