//! Authentication client and submission gate
//!
//! The task controller does not know how users authenticate. It only reads an
//! [`AuthGate`]: while the gate is closed, submissions are refused with
//! [`Error::NotAuthorized`]. [`AuthClient::check_password`] is what normally
//! opens and closes the gate.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::response::classify;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

/// Shared pass/fail signal controlling whether tasks may be submitted
#[derive(Clone, Debug)]
pub struct AuthGate(Arc<AtomicBool>);

impl AuthGate {
    /// A gate that permits submission
    pub fn open() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    /// A gate that refuses submission until opened
    pub fn closed() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    /// Whether submission is currently permitted
    pub fn is_open(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Open or close the gate
    pub fn set(&self, open: bool) {
        self.0.store(open, Ordering::SeqCst);
    }
}

impl Default for AuthGate {
    fn default() -> Self {
        Self::open()
    }
}

/// Result of a password check
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthStatus {
    /// Password accepted
    #[serde(default)]
    pub ok: bool,
    /// Password grants admin rights
    #[serde(default)]
    pub admin: bool,
}

#[derive(Serialize)]
struct CheckRequest<'a> {
    password: &'a str,
}

#[derive(Serialize)]
struct ChangePasswordRequest<'a> {
    admin_key: &'a str,
    new_password: &'a str,
}

#[derive(Deserialize)]
struct ChangePasswordResponse {
    #[serde(default)]
    ok: bool,
}

/// Client for the password check and password change endpoints
#[derive(Clone)]
pub struct AuthClient {
    config: Arc<Config>,
    http: reqwest::Client,
    gate: AuthGate,
}

impl AuthClient {
    /// Create a client that drives `gate`
    pub fn new(config: Config, gate: AuthGate) -> Result<Self> {
        config.validate()?;
        let http = config.http_client()?;
        Ok(Self {
            config: Arc::new(config),
            http,
            gate,
        })
    }

    /// The gate this client opens and closes
    pub fn gate(&self) -> &AuthGate {
        &self.gate
    }

    /// Check a password and open the gate if it is accepted
    ///
    /// Any failure, including a rejected password, leaves the gate closed.
    pub async fn check_password(&self, password: &str) -> Result<AuthStatus> {
        let url = self.config.endpoint_url(&self.config.endpoints.auth_check_path);

        let result = async {
            let response = self
                .http
                .post(&url)
                .json(&CheckRequest { password })
                .send()
                .await?;
            let value = classify(response).await?.into_json()?;
            serde_json::from_value::<AuthStatus>(value)
                .map_err(|e| Error::Protocol(format!("unexpected auth response: {}", e)))
        }
        .await;

        match result {
            Ok(status) => {
                self.gate.set(status.ok);
                info!(ok = status.ok, admin = status.admin, "password check finished");
                Ok(status)
            }
            Err(e) => {
                self.gate.set(false);
                warn!(error = %e, "password check failed");
                Err(e)
            }
        }
    }

    /// Change the access password using the admin key
    pub async fn change_password(&self, admin_key: &str, new_password: &str) -> Result<()> {
        if new_password.trim().is_empty() {
            return Err(Error::InvalidInput("new password must not be empty".to_string()));
        }

        let url = self
            .config
            .endpoint_url(&self.config.endpoints.change_password_path);
        let response = self
            .http
            .post(&url)
            .json(&ChangePasswordRequest {
                admin_key,
                new_password,
            })
            .send()
            .await?;

        // `{"ok": false, "error": "..."}` classifies as a JSON error and surfaces verbatim.
        let value = classify(response).await?.into_json()?;
        let body: ChangePasswordResponse = serde_json::from_value(value)
            .map_err(|e| Error::Protocol(format!("unexpected password change response: {}", e)))?;

        if !body.ok {
            return Err(Error::Server {
                status: None,
                message: "password change rejected".to_string(),
            });
        }

        info!("password changed");
        Ok(())
    }
}
