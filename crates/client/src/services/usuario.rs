use serde::Serialize;

use tesis_core::roles::Role;
use tesis_core::types::DbId;
use tesis_core::user::{validate_new_user, NewUser, User};

use crate::api::ApiClient;
use crate::error::ClientResult;

use super::{or_empty, or_none};

#[derive(Debug, Serialize)]
struct RoleChange {
    rol: Role,
}

#[derive(Debug, Clone)]
pub struct UsuarioService {
    api: ApiClient,
}

impl UsuarioService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> Vec<User> {
        or_empty(self.api.get("/usuarios").await, "usuarios")
    }

    pub async fn get(&self, id: DbId) -> Option<User> {
        or_none(self.api.get(&format!("/usuarios/{id}")).await, "usuario")
    }

    pub async fn create(&self, user: &NewUser) -> ClientResult<User> {
        validate_new_user(user)?;
        let created: User = self.api.post("/usuarios", user).await?;
        tracing::info!(user_id = created.id, rol = created.rol.as_str(), "User created");
        Ok(created)
    }

    pub async fn change_role(&self, id: DbId, rol: Role) -> ClientResult<User> {
        self.api
            .patch(&format!("/usuarios/{id}/rol"), &RoleChange { rol })
            .await
    }
}
