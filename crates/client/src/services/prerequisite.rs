use reqwest::multipart::Form;
use serde::de::IgnoredAny;
use serde::Serialize;

use tesis_core::deliverable::validate_upload;
use tesis_core::prerequisite::{PrerequisiteKind, StudentPrerequisites};
use tesis_core::types::DbId;

use crate::api::{ApiClient, UploadFile};
use crate::error::ClientResult;

use super::or_empty;

#[derive(Debug, Serialize)]
struct VerifyRequest {
    verified: bool,
}

#[derive(Debug, Clone)]
pub struct PrerequisiteService {
    api: ApiClient,
}

impl PrerequisiteService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn dashboard(&self) -> Vec<StudentPrerequisites> {
        or_empty(
            self.api.get("/prerequisitos/dashboard").await,
            "prerequisitos/dashboard",
        )
    }

    /// Student uploads the certificate for one prerequisite.
    pub async fn upload(&self, kind: PrerequisiteKind, file: UploadFile) -> ClientResult<()> {
        validate_upload(&file.file_name, file.size())?;
        let form = Form::new().part("archivo", file.into_part()?);
        let _: IgnoredAny = self
            .api
            .post_multipart(&format!("/prerequisitos/{}", kind.path_segment()), form)
            .await?;
        Ok(())
    }

    /// Set or clear the verified flag of one prerequisite.
    pub async fn verify(
        &self,
        student_id: DbId,
        kind: PrerequisiteKind,
        verified: bool,
    ) -> ClientResult<()> {
        let _: IgnoredAny = self
            .api
            .patch(
                &format!(
                    "/prerequisitos/estudiantes/{student_id}/{}",
                    kind.path_segment()
                ),
                &VerifyRequest { verified },
            )
            .await?;
        tracing::info!(student_id, kind = kind.path_segment(), verified, "Prerequisite updated");
        Ok(())
    }
}
