//! Auth session manager
//!
//! Wraps login, logout, session-check, identity and permission queries on
//! top of the HTTP client. Only one privileged role may hold a session; a
//! successful backend login with any other role is discarded client-side.

use crate::http::{ApiClient, RequestOptions};
use log::{debug, info, warn};
use matchdesk_core::{AdminError, AdminResult, Credentials, ErrorContext, Identity, Role, User};
use reqwest::Method;
use serde::Deserialize;
use std::sync::Arc;

/// Fixed rejection message for non-admin logins
pub const LOGIN_REJECTION_MESSAGE: &str = "Only admin users can access this panel.";

/// Redirect target for any unauthenticated state
pub const LOGIN_ROUTE: &str = "/login";

/// Redirect target after a successful login
pub const HOME_ROUTE: &str = "/";

/// Wire shape of the login endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    access_token: String,
    refresh_token: String,
    user: User,
}

/// Result of a session check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckStatus {
    pub authenticated: bool,
    pub redirect_to: Option<String>,
}

/// Instruction derived from classifying an operation error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorAction {
    pub logout: bool,
    pub redirect_to: Option<String>,
}

/// Session manager over a shared API client
pub struct AuthManager {
    client: Arc<ApiClient>,
}

impl AuthManager {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Authenticate against the backend and open a session
    ///
    /// The backend may authenticate any account; credentials are persisted
    /// only when the returned identity carries the privileged role. Returns
    /// the redirect target for the application root.
    pub async fn login(&self, email: &str, password: &str) -> AdminResult<String> {
        let value = self
            .client
            .send_raw(
                Method::POST,
                "/auth/login",
                RequestOptions::new()
                    .with_body(serde_json::json!({ "email": email, "password": password })),
            )
            .await?;

        let response: LoginResponse = serde_json::from_value(value)?;

        if response.user.role != Role::SuperAdmin {
            warn!(
                "Rejected login for {}: role {} is not allowed",
                email, response.user.role
            );
            return Err(AdminError::Authentication {
                message: LOGIN_REJECTION_MESSAGE.to_string(),
                source: None,
                context: ErrorContext::new("auth")
                    .with_operation("login")
                    .with_metadata("role", &response.user.role.to_string()),
            });
        }

        let identity = normalize_identity(&response.user);
        self.client
            .session()
            .store_credentials(&Credentials {
                access_token: response.access_token,
                refresh_token: response.refresh_token,
                identity,
            })
            .await?;

        info!("Opened admin session for {}", email);
        Ok(HOME_ROUTE.to_string())
    }

    /// Close the session
    ///
    /// Clears all stored credentials and returns the login redirect target.
    /// Succeeds locally whether or not a session existed; no server call.
    pub async fn logout(&self) -> AdminResult<String> {
        self.client.session().clear().await?;
        debug!("Cleared admin session");
        Ok(LOGIN_ROUTE.to_string())
    }

    /// Reauthentication gate for protected route entry
    ///
    /// Session validity is determined empirically by the identity endpoint;
    /// any failure clears the stored credentials. Never errors.
    pub async fn check(&self) -> CheckStatus {
        let token = match self.client.session().access_token().await {
            Ok(token) => token,
            Err(e) => {
                warn!("Credential storage unavailable during check: {}", e);
                None
            }
        };

        if token.is_none() {
            return CheckStatus {
                authenticated: false,
                redirect_to: Some(LOGIN_ROUTE.to_string()),
            };
        }

        match self.client.get("/user/me", Vec::new()).await {
            Ok(_) => CheckStatus {
                authenticated: true,
                redirect_to: None,
            },
            Err(e) => {
                debug!("Session check failed: {}", e);
                if let Err(clear_err) = self.client.session().clear().await {
                    warn!("Failed to clear stale credentials: {}", clear_err);
                }
                CheckStatus {
                    authenticated: false,
                    redirect_to: Some(LOGIN_ROUTE.to_string()),
                }
            }
        }
    }

    /// Fetch the current identity from the backend
    ///
    /// Returns `None` on any failure; route guards poll this
    /// opportunistically and must not see errors.
    pub async fn get_identity(&self) -> Option<Identity> {
        self.client.session().access_token().await.ok().flatten()?;

        match self.client.get("/user/me", Vec::new()).await {
            Ok(value) => match serde_json::from_value::<User>(value) {
                Ok(user) => Some(normalize_identity(&user)),
                Err(e) => {
                    debug!("Unreadable identity payload: {}", e);
                    None
                }
            },
            Err(e) => {
                debug!("Identity fetch failed: {}", e);
                None
            }
        }
    }

    /// Role of the locally cached identity; never touches the network
    pub async fn get_permissions(&self) -> Option<Role> {
        self.client
            .session()
            .identity()
            .await
            .ok()
            .flatten()
            .map(|identity| identity.role)
    }

    /// Classify an operation error
    ///
    /// 401/403 terminate the session: the caller should log out and return
    /// to the login view. Everything else passes through unmodified.
    pub fn on_error(&self, error: &AdminError) -> ErrorAction {
        if error.is_auth_error() {
            ErrorAction {
                logout: true,
                redirect_to: Some(LOGIN_ROUTE.to_string()),
            }
        } else {
            ErrorAction {
                logout: false,
                redirect_to: None,
            }
        }
    }
}

/// Normalize a backend user into the session identity
///
/// The display name prefers the account's random name over its email; the
/// avatar is derived from the display name.
pub(crate) fn normalize_identity(user: &User) -> Identity {
    let name = if user.random_name.is_empty() {
        user.email.clone()
    } else {
        user.random_name.clone()
    };

    let avatar = format!(
        "https://ui-avatars.com/api/?name={}&background=C3E8EB&color=0a0a0a&bold=true",
        urlencoding::encode(&name)
    );

    Identity {
        id: user.id.clone(),
        name,
        email: user.email.clone(),
        avatar,
        role: user.role,
    }
}
