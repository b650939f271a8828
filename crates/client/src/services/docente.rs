use tesis_core::user::Docente;

use crate::api::ApiClient;

use super::or_empty;

#[derive(Debug, Clone)]
pub struct DocenteService {
    api: ApiClient,
}

impl DocenteService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> Vec<Docente> {
        or_empty(self.api.get("/docentes").await, "docentes")
    }

    /// Teachers eligible as tutors.
    pub async fn tutors(&self) -> Vec<Docente> {
        or_empty(self.api.get("/docentes/tutores").await, "docentes/tutores")
    }
}
