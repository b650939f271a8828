use serde::{Deserialize, Serialize};

use tesis_core::error::CoreError;
use tesis_core::user::User;

use crate::api::ApiClient;
use crate::error::ClientResult;

use super::or_none;

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    correo: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
    #[serde(alias = "usuario")]
    user: User,
}

#[derive(Debug, Clone)]
pub struct AuthService {
    api: ApiClient,
}

impl AuthService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Log in and persist the resulting session.
    pub async fn login(&self, correo: &str, password: &str) -> ClientResult<User> {
        if correo.trim().is_empty() || password.is_empty() {
            return Err(CoreError::Validation("Ingrese correo y contraseña".to_string()).into());
        }
        let response: LoginResponse = self
            .api
            .post(
                "/auth/login",
                &LoginRequest {
                    correo: correo.trim(),
                    password,
                },
            )
            .await?;

        tracing::info!(user_id = response.user.id, rol = response.user.rol.as_str(), "Logged in");
        self.api
            .session()
            .establish(response.token, response.user.clone())
            .await?;
        Ok(response.user)
    }

    /// Current user according to the backend; refreshes the cached copy.
    pub async fn me(&self) -> Option<User> {
        let user = or_none(self.api.get::<User>("/auth/me").await, "auth/me")?;
        if let Err(e) = self.api.session().update_user(user.clone()).await {
            tracing::warn!(error = %e, "Failed to persist refreshed user");
        }
        Some(user)
    }

    pub async fn logout(&self) -> ClientResult<()> {
        self.api.session().clear().await?;
        tracing::info!("Logged out");
        Ok(())
    }
}
