use std::path::{Path, PathBuf};

use reqwest::multipart::{Form, Part};

use tesis_core::deliverable::{
    validate_upload, Deliverable, DeliverableHistory, DeliverableType, DocumentSet,
};
use tesis_core::types::DbId;

use crate::api::{ApiClient, Blob, UploadFile};
use crate::download::save_blob;
use crate::error::ClientResult;

use super::or_empty;

/// A freshly uploaded version and the proposal's history after the upload.
#[derive(Debug, Clone)]
pub struct UploadedVersion {
    pub deliverable: Deliverable,
    pub history: DeliverableHistory,
}

#[derive(Debug, Clone)]
pub struct EntregableService {
    api: ApiClient,
}

impl EntregableService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Every version of every deliverable of a proposal.
    pub async fn list(&self, propuesta_id: DbId) -> Vec<Deliverable> {
        or_empty(
            self.api
                .get(&format!("/entregables/propuesta/{propuesta_id}"))
                .await,
            "entregables",
        )
    }

    pub async fn history(&self, propuesta_id: DbId) -> DeliverableHistory {
        let history = DeliverableHistory::new(self.list(propuesta_id).await);
        if let Err(e) = history.check_invariant() {
            tracing::warn!(propuesta_id, error = %e, "Inconsistent deliverable history");
        }
        history
    }

    pub async fn documents(&self, propuesta_id: DbId) -> DocumentSet {
        DocumentSet::from_history(&self.history(propuesta_id).await)
    }

    /// Upload a new version; the backend deactivates the previous one.
    ///
    /// The history is re-read afterwards. If the listing does not show the
    /// new version yet it is applied locally. More than one active version
    /// of a type is reported as a conflict.
    pub async fn upload(
        &self,
        propuesta_id: DbId,
        tipo: DeliverableType,
        file: UploadFile,
    ) -> ClientResult<UploadedVersion> {
        validate_upload(&file.file_name, file.size())?;
        let form = Form::new()
            .part("propuestaId", Part::text(propuesta_id.to_string()))
            .part("tipo", Part::text(tipo.as_str()))
            .part("archivo", file.into_part()?);
        let created: Deliverable = self.api.post_multipart("/entregables", form).await?;
        tracing::info!(
            propuesta_id,
            tipo = tipo.as_str(),
            version = created.version,
            "Deliverable uploaded",
        );

        let mut history = self.history(propuesta_id).await;
        if !history.items().iter().any(|d| d.id == created.id) {
            history.apply_upload(created.clone());
        }
        history.check_invariant()?;
        Ok(UploadedVersion {
            deliverable: created,
            history,
        })
    }

    pub async fn download(&self, id: DbId) -> ClientResult<Blob> {
        self.api
            .get_bytes(&format!("/entregables/{id}/descargar"))
            .await
    }

    /// Download into the configured download directory.
    pub async fn save(&self, id: DbId) -> ClientResult<PathBuf> {
        self.download_to(id, self.api.download_dir()).await
    }

    /// Download and write the file into `dir`.
    pub async fn download_to(&self, id: DbId, dir: &Path) -> ClientResult<PathBuf> {
        let blob = self.download(id).await?;
        save_blob(dir, &blob, &format!("entregable-{id}.pdf")).await
    }
}
