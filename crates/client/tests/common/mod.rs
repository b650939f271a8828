#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::extract::{Multipart, Path, Request, State};
use axum::http::header::{AUTHORIZATION, CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};

use tesis_client::error::{ClientError, ClientResult};
use tesis_client::ports::{DefensePort, DeliverablePort, NotificationPort, PrerequisitePort};
use tesis_client::session::Session;
use tesis_client::{ApiClient, Backend, ClientConfig, SessionHandle};
use tesis_core::defense::{DefenseKind, DefenseRecord, DefenseState, Schedule, Tribunal};
use tesis_core::deliverable::DocumentSet;
use tesis_core::notification::Notification;
use tesis_core::prerequisite::{PrerequisiteKind, StudentPrerequisites};
use tesis_core::types::DbId;

pub const TOKEN: &str = "tok-123";
pub const LOGIN_EMAIL: &str = "coordinador@uide.edu.ec";
pub const LOGIN_PASSWORD: &str = "secret";

// ---------------------------------------------------------------------------
// Mock backend
// ---------------------------------------------------------------------------

/// In-memory data served by the mock backend.
#[derive(Debug, Default)]
pub struct MockState {
    pub proposals: Vec<Value>,
    pub tutors: Vec<Value>,
    pub assignments: Vec<Value>,
    pub private_defenses: Vec<Value>,
    pub public_defenses: Vec<Value>,
    pub deliverables: Vec<Value>,
    pub prerequisites: Vec<Value>,
    pub notifications: Vec<Value>,
    /// `"METHOD /path"` of every request received, in order.
    pub calls: Vec<String>,
    /// `Authorization` header of every request received.
    pub auth_headers: Vec<Option<String>>,
    /// Handler keys that must answer 500 (`deactivate` instead leaves the
    /// previous deliverable version active).
    pub failing: HashSet<&'static str>,
}

pub type Shared = Arc<Mutex<MockState>>;

pub struct MockServer {
    pub url: String,
    pub state: Shared,
}

impl MockServer {
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn called(&self, needle: &str) -> bool {
        self.calls().iter().any(|c| c.contains(needle))
    }

    pub fn fail(&self, key: &'static str) {
        self.state.lock().unwrap().failing.insert(key);
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::for_url(&self.url)
    }

    pub fn api(&self, token: Option<&str>) -> ApiClient {
        let session = SessionHandle::in_memory(Session {
            token: token.map(str::to_string),
            user: None,
        });
        ApiClient::new(&self.config(), session)
    }

    pub fn backend(&self) -> Backend {
        Backend::new(self.api(Some(TOKEN)))
    }
}

/// Spawn the mock on `127.0.0.1:0` and return its base URL.
pub async fn spawn_mock(state: MockState) -> MockServer {
    let shared: Shared = Arc::new(Mutex::new(state));

    let api = Router::new()
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        .route("/propuestas", get(list_proposals))
        .route("/propuestas/{id}", get(get_proposal))
        .route("/docentes/tutores", get(list_tutors))
        .route(
            "/trabajos-titulacion",
            get(list_assignments).post(assign_tutor),
        )
        .route("/defensas/{kind}", get(list_defenses))
        .route("/defensas/{kind}/{id}/programar", put(schedule_defense))
        .route("/defensas/{kind}/{id}/participantes", put(assign_participants))
        .route("/entregables", post(upload_deliverable))
        .route("/entregables/propuesta/{id}", get(list_deliverables))
        .route("/entregables/{id}/descargar", get(download_deliverable))
        .route("/prerequisitos/dashboard", get(prerequisite_dashboard))
        .route(
            "/prerequisitos/estudiantes/{id}/{kind}",
            patch(verify_prerequisite),
        )
        .route("/notificaciones", get(list_notifications))
        .route("/notificaciones/no-leidas/count", get(unread_notifications))
        .route("/notificaciones/leidas", patch(mark_all_read))
        .route(
            "/notificaciones/{id}",
            axum::routing::delete(delete_notification),
        )
        .route("/notificaciones/{id}/leida", patch(mark_read))
        .route("/boom", get(boom));

    let app = Router::new()
        .nest("/api/v1", api)
        .layer(middleware::from_fn_with_state(shared.clone(), record))
        .with_state(shared.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockServer {
        url: format!("http://{addr}"),
        state: shared,
    }
}

/// Base URL nothing listens on.
pub async fn dead_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

async fn record(State(state): State<Shared>, req: Request, next: Next) -> Response {
    {
        let mut s = state.lock().unwrap();
        s.calls.push(format!("{} {}", req.method(), req.uri().path()));
        s.auth_headers.push(
            req.headers()
                .get(AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        );
    }
    next.run(req).await
}

fn failing(state: &Shared, key: &str) -> bool {
    state.lock().unwrap().failing.contains(key)
}

fn server_error(message: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "message": message })),
    )
        .into_response()
}

// ---- handlers ----

async fn login(Json(body): Json<Value>) -> Response {
    if body["correo"] == LOGIN_EMAIL && body["password"] == LOGIN_PASSWORD {
        Json(json!({
            "token": TOKEN,
            "usuario": {
                "id": 3,
                "nombres": "Ana",
                "apellidos": "Torres",
                "correo": LOGIN_EMAIL,
                "rol": "COORDINADOR"
            }
        }))
        .into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Credenciales inválidas" })),
        )
            .into_response()
    }
}

async fn me(req: Request) -> Response {
    let authorized = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some(format!("Bearer {TOKEN}").as_str());
    if !authorized {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "mensaje": "Token inválido" })),
        )
            .into_response();
    }
    Json(json!({
        "id": 3,
        "nombres": "Ana",
        "apellidos": "Torres",
        "correo": LOGIN_EMAIL,
        "rol": "COORDINADOR"
    }))
    .into_response()
}

async fn list_proposals(State(state): State<Shared>) -> Response {
    if failing(&state, "propuestas") {
        return server_error("Error interno");
    }
    Json(state.lock().unwrap().proposals.clone()).into_response()
}

async fn get_proposal(State(state): State<Shared>, Path(id): Path<i64>) -> Response {
    let s = state.lock().unwrap();
    match s.proposals.iter().find(|p| p["id"] == id) {
        Some(p) => Json(p.clone()).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "mensaje": "Propuesta no encontrada" })),
        )
            .into_response(),
    }
}

async fn list_tutors(State(state): State<Shared>) -> Json<Vec<Value>> {
    Json(state.lock().unwrap().tutors.clone())
}

async fn assign_tutor(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    if failing(&state, "trabajos") {
        return server_error("No se pudo asignar el tutor");
    }
    let mut s = state.lock().unwrap();
    let tutor = s
        .tutors
        .iter()
        .find(|t| t["id"] == body["tutorId"])
        .cloned();
    let Some(tutor) = tutor else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Tutor inexistente" })),
        )
            .into_response();
    };
    if let Some(p) = s
        .proposals
        .iter_mut()
        .find(|p| p["id"] == body["propuestaId"])
    {
        p["tutor"] = tutor;
    }
    let created = json!({
        "id": 900 + s.assignments.len(),
        "propuestaId": body["propuestaId"],
        "tutorId": body["tutorId"],
        "activo": true
    });
    s.assignments.push(created.clone());
    Json(created).into_response()
}

async fn list_assignments(State(state): State<Shared>) -> Json<Vec<Value>> {
    Json(state.lock().unwrap().assignments.clone())
}

fn defenses_mut<'a>(s: &'a mut MockState, kind: &str) -> &'a mut Vec<Value> {
    if kind == "publica" {
        &mut s.public_defenses
    } else {
        &mut s.private_defenses
    }
}

async fn list_defenses(State(state): State<Shared>, Path(kind): Path<String>) -> Json<Vec<Value>> {
    let mut s = state.lock().unwrap();
    Json(defenses_mut(&mut s, &kind).clone())
}

async fn schedule_defense(
    State(state): State<Shared>,
    Path((kind, id)): Path<(String, i64)>,
    Json(body): Json<Value>,
) -> Response {
    if failing(&state, "programar") {
        return server_error("No se pudo programar");
    }
    let mut s = state.lock().unwrap();
    let Some(d) = defenses_mut(&mut s, &kind).iter_mut().find(|d| d["id"] == id) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    d["estado"] = json!("PROGRAMADA");
    d["fecha"] = body["fecha"].clone();
    d["hora"] = body["hora"].clone();
    d["aula"] = body["aula"].clone();
    Json(d.clone()).into_response()
}

async fn assign_participants(
    State(state): State<Shared>,
    Path((kind, id)): Path<(String, i64)>,
    Json(body): Json<Value>,
) -> Response {
    if failing(&state, "participantes") {
        return server_error("Tribunal inválido");
    }
    let mut s = state.lock().unwrap();
    let Some(d) = defenses_mut(&mut s, &kind).iter_mut().find(|d| d["id"] == id) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    d["participantes"] = body["participantes"].clone();
    Json(d.clone()).into_response()
}

async fn upload_deliverable(State(state): State<Shared>, mut multipart: Multipart) -> Response {
    let mut fields: HashMap<String, String> = HashMap::new();
    let mut file_name = String::new();
    let mut size = 0usize;
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        if name == "archivo" {
            file_name = field.file_name().unwrap_or_default().to_string();
            size = field.bytes().await.map(|b| b.len()).unwrap_or_default();
        } else {
            fields.insert(name, field.text().await.unwrap_or_default());
        }
    }
    let propuesta_id: i64 = fields
        .get("propuestaId")
        .and_then(|v| v.parse().ok())
        .unwrap_or_default();
    let tipo = fields.get("tipo").cloned().unwrap_or_default();

    let keep_previous_active = failing(&state, "deactivate");
    let mut s = state.lock().unwrap();
    let version = s
        .deliverables
        .iter()
        .filter(|d| d["propuestaId"] == propuesta_id && d["tipo"] == tipo.as_str())
        .count()
        + 1;
    if !keep_previous_active {
        for d in s
            .deliverables
            .iter_mut()
            .filter(|d| d["propuestaId"] == propuesta_id && d["tipo"] == tipo.as_str())
        {
            d["isActive"] = json!(false);
        }
    }
    let created = json!({
        "id": 500 + s.deliverables.len(),
        "propuestaId": propuesta_id,
        "tipo": tipo,
        "version": version,
        "isActive": true,
        "nombreArchivo": file_name,
        "tamano": size
    });
    s.deliverables.push(created.clone());
    (StatusCode::CREATED, Json(created)).into_response()
}

async fn list_deliverables(State(state): State<Shared>, Path(id): Path<i64>) -> Response {
    if failing(&state, "entregables") {
        return server_error("Error al listar entregables");
    }
    let s = state.lock().unwrap();
    let rows: Vec<Value> = s
        .deliverables
        .iter()
        .filter(|d| d["propuestaId"] == id)
        .cloned()
        .collect();
    Json(rows).into_response()
}

async fn download_deliverable(Path(id): Path<i64>) -> Response {
    (
        [
            (CONTENT_TYPE, "application/pdf".to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"entregable_{id}.pdf\""),
            ),
        ],
        b"%PDF-1.7 mock".to_vec(),
    )
        .into_response()
}

async fn prerequisite_dashboard(State(state): State<Shared>) -> Json<Vec<Value>> {
    Json(state.lock().unwrap().prerequisites.clone())
}

async fn verify_prerequisite(
    State(state): State<Shared>,
    Path((id, kind)): Path<(i64, String)>,
    Json(body): Json<Value>,
) -> Response {
    if failing(&state, "verify") {
        return server_error("No se pudo verificar");
    }
    let field = match kind.as_str() {
        "ingles" => "english",
        "practicas" => "internship",
        "vinculacion" => "community",
        _ => return StatusCode::BAD_REQUEST.into_response(),
    };
    let mut s = state.lock().unwrap();
    if let Some(row) = s.prerequisites.iter_mut().find(|r| r["id"] == id) {
        row[field] = json!({ "verified": body["verified"] });
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn list_notifications(State(state): State<Shared>) -> Json<Vec<Value>> {
    Json(state.lock().unwrap().notifications.clone())
}

async fn unread_notifications(State(state): State<Shared>) -> Json<Value> {
    let s = state.lock().unwrap();
    let count = s
        .notifications
        .iter()
        .filter(|n| n["leida"] != true)
        .count();
    Json(json!({ "count": count }))
}

async fn mark_read(State(state): State<Shared>, Path(id): Path<i64>) -> Response {
    if failing(&state, "leida") {
        return server_error("No se pudo marcar");
    }
    let mut s = state.lock().unwrap();
    if let Some(n) = s.notifications.iter_mut().find(|n| n["id"] == id) {
        n["leida"] = json!(true);
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn mark_all_read(State(state): State<Shared>) -> StatusCode {
    let mut s = state.lock().unwrap();
    for n in s.notifications.iter_mut() {
        n["leida"] = json!(true);
    }
    StatusCode::NO_CONTENT
}

async fn delete_notification(State(state): State<Shared>, Path(id): Path<i64>) -> StatusCode {
    state
        .lock()
        .unwrap()
        .notifications
        .retain(|n| n["id"] != id);
    StatusCode::NO_CONTENT
}

async fn boom() -> Response {
    (StatusCode::BAD_GATEWAY, "<html>upstream down</html>").into_response()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn tutor_json(id: i64, titulo: &str, nombres: &str, apellidos: &str) -> Value {
    json!({ "id": id, "titulo": titulo, "nombres": nombres, "apellidos": apellidos })
}

pub fn proposal_json(id: i64, titulo: &str, estado: &str, tutor: Option<Value>) -> Value {
    json!({
        "id": id,
        "titulo": titulo,
        "objetivoGeneral": "Objetivo",
        "problematica": "Problema",
        "alcance": "Alcance",
        "areaConocimiento": "Software",
        "estudiante": { "id": 50 + id, "nombres": "Luis", "apellidos": "Mora" },
        "estado": estado,
        "tutor": tutor,
        "votosTutores": []
    })
}

pub fn defense_json(id: i64, propuesta_id: i64, tipo: &str, estado: &str) -> Value {
    json!({
        "id": id,
        "propuestaId": propuesta_id,
        "tipo": tipo,
        "estado": estado,
        "titulo": format!("Tesis {propuesta_id}"),
        "participantes": []
    })
}

pub fn deliverable_json(id: i64, propuesta_id: i64, tipo: &str, active: bool) -> Value {
    json!({
        "id": id,
        "propuestaId": propuesta_id,
        "tipo": tipo,
        "version": 1,
        "isActive": active,
        "nombreArchivo": format!("{}.pdf", tipo.to_lowercase())
    })
}

pub fn student_json(id: i64, english: bool, internship: bool, community: bool) -> Value {
    json!({
        "id": id,
        "nombres": format!("Estudiante {id}"),
        "apellidos": "Prueba",
        "correo": format!("e{id}@uide.edu.ec"),
        "english": { "verified": english },
        "internship": { "verified": internship },
        "community": { "verified": community }
    })
}

pub fn notification_json(id: i64, leida: bool) -> Value {
    json!({ "id": id, "mensaje": format!("Aviso {id}"), "leida": leida })
}

pub fn all_documents() -> DocumentSet {
    DocumentSet {
        tesis: true,
        user_manual: true,
        scientific_article: true,
    }
}

// ---------------------------------------------------------------------------
// In-memory port fakes
// ---------------------------------------------------------------------------

/// Defense + deliverable fake that counts mutations.
#[derive(Default)]
pub struct FakeDefenses {
    pub private: Mutex<Vec<DefenseRecord>>,
    pub public: Mutex<Vec<DefenseRecord>>,
    pub documents: Mutex<HashMap<DbId, DocumentSet>>,
    pub schedule_calls: Mutex<Vec<DbId>>,
    pub participant_calls: Mutex<Vec<DbId>>,
    pub fail_participants: bool,
    pub loads: Mutex<usize>,
}

impl FakeDefenses {
    pub fn with_private(records: Vec<DefenseRecord>) -> Self {
        Self {
            private: Mutex::new(records),
            ..Self::default()
        }
    }

    pub fn set_documents(&self, propuesta_id: DbId, docs: DocumentSet) {
        self.documents.lock().unwrap().insert(propuesta_id, docs);
    }
}

#[async_trait]
impl DefensePort for FakeDefenses {
    async fn defenses(&self, kind: DefenseKind) -> Vec<DefenseRecord> {
        *self.loads.lock().unwrap() += 1;
        match kind {
            DefenseKind::Privada => self.private.lock().unwrap().clone(),
            DefenseKind::Publica => self.public.lock().unwrap().clone(),
        }
    }

    async fn schedule(&self, _kind: DefenseKind, id: DbId, _schedule: &Schedule) -> ClientResult<()> {
        self.schedule_calls.lock().unwrap().push(id);
        if let Some(r) = self.private.lock().unwrap().iter_mut().find(|r| r.id == id) {
            r.estado = DefenseState::Programada;
        }
        Ok(())
    }

    async fn assign_participants(
        &self,
        _kind: DefenseKind,
        id: DbId,
        _tribunal: &Tribunal,
    ) -> ClientResult<()> {
        self.participant_calls.lock().unwrap().push(id);
        if self.fail_participants {
            return Err(ClientError::Api {
                status: 500,
                message: "Tribunal inválido".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl DeliverablePort for FakeDefenses {
    async fn documents(&self, propuesta_id: DbId) -> DocumentSet {
        self.documents
            .lock()
            .unwrap()
            .get(&propuesta_id)
            .copied()
            .unwrap_or_default()
    }
}

/// Prerequisite fake; `reject` makes every verify call fail.
#[derive(Default)]
pub struct FakePrerequisites {
    pub rows: Mutex<Vec<StudentPrerequisites>>,
    pub reject: bool,
    pub dashboard_loads: Mutex<usize>,
}

#[async_trait]
impl PrerequisitePort for FakePrerequisites {
    async fn dashboard(&self) -> Vec<StudentPrerequisites> {
        *self.dashboard_loads.lock().unwrap() += 1;
        self.rows.lock().unwrap().clone()
    }

    async fn set_verified(
        &self,
        student_id: DbId,
        kind: PrerequisiteKind,
        verified: bool,
    ) -> ClientResult<()> {
        if self.reject {
            return Err(ClientError::Api {
                status: 403,
                message: "Sin permisos".into(),
            });
        }
        if let Some(row) = self
            .rows
            .lock()
            .unwrap()
            .iter_mut()
            .find(|r| r.id == student_id)
        {
            row.set_verified(kind, verified);
        }
        Ok(())
    }
}

/// Notification fake with a settable unread counter.
#[derive(Default)]
pub struct FakeNotifications {
    pub items: Mutex<Vec<Notification>>,
    pub unread: Mutex<Option<u64>>,
    pub reject: bool,
}

#[async_trait]
impl NotificationPort for FakeNotifications {
    async fn notifications(&self) -> Vec<Notification> {
        self.items.lock().unwrap().clone()
    }

    async fn unread_count(&self) -> Option<u64> {
        *self.unread.lock().unwrap()
    }

    async fn mark_read(&self, _id: DbId) -> ClientResult<()> {
        if self.reject {
            return Err(ClientError::Api {
                status: 500,
                message: "request failed".into(),
            });
        }
        Ok(())
    }

    async fn mark_all_read(&self) -> ClientResult<()> {
        self.mark_read(0).await
    }

    async fn delete(&self, id: DbId) -> ClientResult<()> {
        self.mark_read(id).await
    }
}
