//! End-to-end board flows against the mock backend and in-memory ports.

mod common;

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use chrono::{NaiveDate, NaiveTime};
use tokio_util::sync::CancellationToken;

use common::*;
use tesis_client::boards::{
    NotificationCenter, PrerequisiteBoard, PrivateDefenseBoard, PublicDefenseBoard,
    TutorAssignmentBoard,
};
use tesis_client::error::ClientError;
use tesis_client::poller::NotificationPoller;
use tesis_core::defense::{
    DefenseAssignmentDraft, DefenseRecord, DefenseUiStatus, Grade, ScheduleDraft, TribunalDraft,
    DUPLICATE_TRIBUNAL_MEMBER, REQUIRED_FIELDS_MESSAGE,
};
use tesis_core::deliverable::DocumentSet;
use tesis_core::error::CoreError;
use tesis_core::notification::Notification;
use tesis_core::prerequisite::{PrerequisiteFilter, PrerequisiteKind, StudentPrerequisites};
use tesis_core::proposal::{TUTOR_ASSIGNED_LABEL, TUTOR_MISSING_LABEL};
use tesis_core::roles::Role;
use tesis_core::workflow::WorkflowState;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
}

fn draft(defense_id: i64, presidente: i64, jurado1: i64, jurado2: i64) -> DefenseAssignmentDraft {
    DefenseAssignmentDraft {
        defense_id,
        schedule: ScheduleDraft {
            fecha: NaiveDate::from_ymd_opt(2025, 3, 20),
            hora: NaiveTime::from_hms_opt(10, 0, 0),
            aula: "Aula 204".into(),
        },
        tribunal: TribunalDraft {
            presidente: Some(presidente),
            jurado1: Some(jurado1),
            jurado2: Some(jurado2),
        },
    }
}

fn record(id: i64, propuesta_id: i64, tipo: &str, estado: &str) -> DefenseRecord {
    serde_json::from_value(defense_json(id, propuesta_id, tipo, estado)).unwrap()
}

fn student(id: i64, english: bool, internship: bool, community: bool) -> StudentPrerequisites {
    serde_json::from_value(student_json(id, english, internship, community)).unwrap()
}

fn notification(id: i64, leida: bool) -> Notification {
    serde_json::from_value(notification_json(id, leida)).unwrap()
}

// ---------------------------------------------------------------------------
// Prerequisite dashboard
// ---------------------------------------------------------------------------

#[tokio::test]
async fn prerequisite_filters_split_pending_and_approved() {
    let port = Arc::new(FakePrerequisites {
        rows: vec![student(1, true, true, true), student(2, true, false, true)].into(),
        ..FakePrerequisites::default()
    });
    let mut board = PrerequisiteBoard::new(port, Role::Coordinador);
    board.load().await;

    board.set_filter(PrerequisiteFilter::Pending);
    let pending: Vec<i64> = board.rows().iter().map(|r| r.id).collect();
    assert_eq!(pending, vec![2]);

    board.set_filter(PrerequisiteFilter::Approved);
    let approved: Vec<i64> = board.rows().iter().map(|r| r.id).collect();
    assert_eq!(approved, vec![1]);

    let summary = board.summary();
    assert_eq!((summary.total, summary.approved, summary.pending), (2, 1, 1));
}

#[tokio::test]
async fn prerequisite_toggle_moves_student_to_approved() {
    let port = Arc::new(FakePrerequisites {
        rows: vec![student(2, true, false, true)].into(),
        ..FakePrerequisites::default()
    });
    let mut board = PrerequisiteBoard::new(port.clone(), Role::DocenteIntegracion);
    board.load().await;

    let verified = board.toggle(2, PrerequisiteKind::Practicas).await.unwrap();

    assert!(verified);
    board.set_filter(PrerequisiteFilter::Approved);
    assert_eq!(board.rows().len(), 1);
    assert_eq!(*port.dashboard_loads.lock().unwrap(), 1);
}

#[tokio::test]
async fn rejected_toggle_reloads_dashboard() {
    let port = Arc::new(FakePrerequisites {
        rows: vec![student(2, true, false, true)].into(),
        reject: true,
        ..FakePrerequisites::default()
    });
    let mut board = PrerequisiteBoard::new(port.clone(), Role::Coordinador);
    board.load().await;
    let before = board.generation();

    let err = board.toggle(2, PrerequisiteKind::Practicas).await.unwrap_err();

    assert_eq!(err.status(), Some(403));
    assert!(!board.student(2).unwrap().is_verified(PrerequisiteKind::Practicas));
    assert!(board.generation() > before);
    assert_eq!(*port.dashboard_loads.lock().unwrap(), 2);
}

#[tokio::test]
async fn students_cannot_toggle_prerequisites() {
    let port = Arc::new(FakePrerequisites {
        rows: vec![student(2, false, false, false)].into(),
        ..FakePrerequisites::default()
    });
    let mut board = PrerequisiteBoard::new(port, Role::Estudiante);
    board.load().await;

    let err = board.toggle(2, PrerequisiteKind::Ingles).await.unwrap_err();

    assert_matches!(err, ClientError::Core(CoreError::Forbidden(_)));
    assert!(!board.student(2).unwrap().is_verified(PrerequisiteKind::Ingles));
}

#[tokio::test]
async fn prerequisite_toggle_through_backend() {
    let mock = spawn_mock(MockState {
        prerequisites: vec![student_json(4, false, true, true)],
        ..MockState::default()
    })
    .await;
    let mut board = PrerequisiteBoard::new(Arc::new(mock.backend()), Role::Coordinador);
    board.load().await;

    board.toggle(4, PrerequisiteKind::Ingles).await.unwrap();
    board.load().await;

    assert!(board.student(4).unwrap().fully_verified());
    assert!(mock.called("PATCH /api/v1/prerequisitos/estudiantes/4/ingles"));
}

// ---------------------------------------------------------------------------
// Tutor assignment
// ---------------------------------------------------------------------------

fn tutor_mock_state() -> MockState {
    MockState {
        proposals: vec![
            proposal_json(101, "Sistema de gestión académica", "APROBADA", None),
            proposal_json(102, "Análisis de datos", "PENDIENTE", None),
        ],
        tutors: vec![
            tutor_json(2, "Dra.", "Maria Elena", "Silva"),
            tutor_json(3, "Ing.", "Carlos", "Vega"),
        ],
        ..MockState::default()
    }
}

#[tokio::test]
async fn confirmed_tutor_assignment_shows_after_reload() {
    let mock = spawn_mock(tutor_mock_state()).await;
    let backend = Arc::new(mock.backend());
    let mut board = TutorAssignmentBoard::new(backend.clone(), backend, Role::Director);
    board.load().await;
    assert_eq!(
        board.proposal(101).unwrap().tutoring_label(),
        TUTOR_MISSING_LABEL
    );

    board.stage(101, 2).unwrap();
    let staged = board.open_confirmation().unwrap();
    assert_eq!(staged.tutor.display_name(), "Dra. Maria Elena Silva");
    assert!(!mock.called("POST"));

    board.confirm().await.unwrap();

    assert_matches!(board.workflow().state(), WorkflowState::Succeeded);
    let proposal = board.proposal(101).unwrap();
    assert_eq!(proposal.tutoring_label(), TUTOR_ASSIGNED_LABEL);
    assert_eq!(proposal.tutor_name().as_deref(), Some("Dra. Maria Elena Silva"));
    assert!(mock.called("POST /api/v1/trabajos-titulacion"));
}

#[tokio::test]
async fn cancelled_tutor_assignment_sends_nothing() {
    let mock = spawn_mock(tutor_mock_state()).await;
    let backend = Arc::new(mock.backend());
    let mut board = TutorAssignmentBoard::new(backend.clone(), backend, Role::Coordinador);
    board.load().await;

    board.stage(101, 3).unwrap();
    board.open_confirmation().unwrap();
    board.cancel().unwrap();

    assert_matches!(board.workflow().state(), WorkflowState::Idle);
    assert!(!mock.called("trabajos-titulacion"));
    assert!(board.proposal(101).unwrap().tutor.is_none());
}

#[tokio::test]
async fn failed_tutor_assignment_keeps_error_for_display() {
    let mock = spawn_mock(tutor_mock_state()).await;
    mock.fail("trabajos");
    let backend = Arc::new(mock.backend());
    let mut board = TutorAssignmentBoard::new(backend.clone(), backend, Role::Director);
    board.load().await;

    board.stage(101, 2).unwrap();
    board.open_confirmation().unwrap();
    let err = board.confirm().await.unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert_eq!(
        board.workflow().error_message(),
        Some("No se pudo asignar el tutor")
    );
    assert!(board.proposal(101).unwrap().tutor.is_none());
}

#[tokio::test]
async fn duplicate_active_assignment_fails_confirmation() {
    let mut state = tutor_mock_state();
    state.assignments = vec![serde_json::json!({
        "id": 40,
        "propuestaId": 101,
        "tutorId": 3,
        "activo": true
    })];
    let mock = spawn_mock(state).await;
    let backend = Arc::new(mock.backend());
    let mut board = TutorAssignmentBoard::new(backend.clone(), backend.clone(), Role::Director);
    board.load().await;

    board.stage(101, 2).unwrap();
    board.open_confirmation().unwrap();
    let err = board.confirm().await.unwrap_err();

    assert_matches!(err, ClientError::Core(CoreError::Conflict(_)));
    assert_matches!(board.workflow().state(), WorkflowState::Failed(_));
    assert!(mock.called("GET /api/v1/trabajos-titulacion"));
    assert_matches!(
        backend.tutoring.active_for(101).await,
        Err(ClientError::Core(CoreError::Conflict(_)))
    );
}

#[tokio::test]
async fn single_active_assignment_is_reported() {
    let mock = spawn_mock(tutor_mock_state()).await;
    let backend = Arc::new(mock.backend());
    let mut board = TutorAssignmentBoard::new(backend.clone(), backend.clone(), Role::Director);
    board.load().await;
    board.stage(101, 2).unwrap();
    board.open_confirmation().unwrap();
    board.confirm().await.unwrap();

    let active = backend.tutoring.active_for(101).await.unwrap().unwrap();

    assert_eq!(active.tutor_id, 2);
    assert!(backend.tutoring.active_for(102).await.unwrap().is_none());
}

#[tokio::test]
async fn unapproved_proposals_cannot_be_staged() {
    let mock = spawn_mock(tutor_mock_state()).await;
    let backend = Arc::new(mock.backend());
    let mut board = TutorAssignmentBoard::new(backend.clone(), backend, Role::Director);
    board.load().await;

    let err = board.stage(102, 2).unwrap_err();

    assert_matches!(err, ClientError::Core(CoreError::Precondition(_)));
    assert_matches!(board.workflow().state(), WorkflowState::Idle);
}

#[tokio::test]
async fn tutor_board_search_filters_rows() {
    let mock = spawn_mock(tutor_mock_state()).await;
    let backend = Arc::new(mock.backend());
    let mut board = TutorAssignmentBoard::new(backend.clone(), backend, Role::Director);
    board.load().await;

    board.set_query("gestion");
    let ids: Vec<i64> = board.rows().iter().map(|p| p.id).collect();

    assert_eq!(ids, vec![101]);
}

// ---------------------------------------------------------------------------
// Private defense assignment
// ---------------------------------------------------------------------------

fn defense_mock_state() -> MockState {
    MockState {
        private_defenses: vec![defense_json(1, 7, "PRIVADA", "PENDIENTE")],
        deliverables: vec![
            deliverable_json(11, 7, "TESIS", true),
            deliverable_json(12, 7, "MANUAL_USUARIO", true),
            deliverable_json(13, 7, "ARTICULO", true),
        ],
        ..MockState::default()
    }
}

#[tokio::test]
async fn duplicate_tribunal_member_blocks_submission() {
    let mock = spawn_mock(defense_mock_state()).await;
    let backend = Arc::new(mock.backend());
    let mut board = PrivateDefenseBoard::new(backend.clone(), backend, Role::Coordinador);
    board.load().await;
    board.open_assignment(1).unwrap();

    let err = board.stage(&draft(1, 5, 5, 6), today()).unwrap_err();

    assert_eq!(err.user_message(), DUPLICATE_TRIBUNAL_MEMBER);
    assert_matches!(board.workflow().state(), WorkflowState::Idle);
    assert!(!mock.called("programar"));
    assert!(!mock.called("participantes"));
}

#[tokio::test]
async fn incomplete_dialog_reports_required_fields() {
    let defenses = Arc::new(FakeDefenses::with_private(vec![record(1, 7, "PRIVADA", "PENDIENTE")]));
    defenses.set_documents(7, all_documents());
    let mut board = PrivateDefenseBoard::new(defenses.clone(), defenses.clone(), Role::Director);
    board.load().await;
    board.open_assignment(1).unwrap();

    let mut incomplete = draft(1, 5, 6, 8);
    incomplete.schedule.aula = "  ".into();
    let err = board.stage(&incomplete, today()).unwrap_err();

    assert_eq!(err.user_message(), REQUIRED_FIELDS_MESSAGE);
    assert!(defenses.schedule_calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn confirmed_defense_assignment_schedules_and_assigns() {
    let mock = spawn_mock(defense_mock_state()).await;
    let backend = Arc::new(mock.backend());
    let mut board = PrivateDefenseBoard::new(backend.clone(), backend, Role::Coordinador);
    board.load().await;
    board.open_assignment(1).unwrap();

    board.stage(&draft(1, 5, 6, 8), today()).unwrap();
    let staged = board.open_confirmation().unwrap();
    assert!(staged.tribunal.contains(8));
    board.confirm().await.unwrap();

    let calls = mock.calls();
    let schedule = calls.iter().position(|c| c.ends_with("/programar")).unwrap();
    let participants = calls.iter().position(|c| c.ends_with("/participantes")).unwrap();
    assert!(schedule < participants);

    assert_matches!(board.workflow().state(), WorkflowState::Succeeded);
    assert_eq!(board.dialog(), None);
    assert_eq!(board.card(1).unwrap().status, DefenseUiStatus::Assigned);
    let stored = &board.records()[0];
    assert_eq!(stored.hora.as_deref(), Some("10:00"));
    assert_eq!(stored.participantes.len(), 3);
}

#[tokio::test]
async fn failed_participant_assignment_ends_failed() {
    let defenses = Arc::new(FakeDefenses {
        fail_participants: true,
        ..FakeDefenses::with_private(vec![record(1, 7, "PRIVADA", "PENDIENTE")])
    });
    defenses.set_documents(7, all_documents());
    let mut board = PrivateDefenseBoard::new(defenses.clone(), defenses.clone(), Role::Coordinador);
    board.load().await;
    board.open_assignment(1).unwrap();
    board.stage(&draft(1, 5, 6, 8), today()).unwrap();
    board.open_confirmation().unwrap();
    let loads_before = *defenses.loads.lock().unwrap();

    let err = board.confirm().await.unwrap_err();

    assert_eq!(err.user_message(), "Tribunal inválido");
    assert_eq!(board.workflow().error_message(), Some("Tribunal inválido"));
    assert_eq!(*defenses.schedule_calls.lock().unwrap(), vec![1]);
    assert_eq!(*defenses.participant_calls.lock().unwrap(), vec![1]);
    assert_eq!(board.dialog(), Some(1));
    // Reloaded: the schedule that did land is what the card shows.
    assert_eq!(*defenses.loads.lock().unwrap(), loads_before + 1);
    assert_eq!(board.card(1).unwrap().status, DefenseUiStatus::Assigned);
}

#[tokio::test]
async fn staging_requires_the_dialog_for_that_defense() {
    let defenses = Arc::new(FakeDefenses::with_private(vec![record(1, 7, "PRIVADA", "PENDIENTE")]));
    defenses.set_documents(7, all_documents());
    let mut board = PrivateDefenseBoard::new(defenses.clone(), defenses, Role::Coordinador);
    board.load().await;

    let err = board.stage(&draft(1, 5, 6, 8), today()).unwrap_err();

    assert_matches!(err, ClientError::Core(CoreError::Precondition(_)));
}

// ---------------------------------------------------------------------------
// Document readiness gate
// ---------------------------------------------------------------------------

async fn gate_board(estado: &str, docs: DocumentSet) -> PrivateDefenseBoard {
    let defenses = Arc::new(FakeDefenses::with_private(vec![record(1, 7, "PRIVADA", estado)]));
    defenses.set_documents(7, docs);
    let mut board = PrivateDefenseBoard::new(defenses.clone(), defenses, Role::Coordinador);
    board.load().await;
    board
}

fn without_manual() -> DocumentSet {
    DocumentSet {
        user_manual: false,
        ..all_documents()
    }
}

#[tokio::test]
async fn missing_document_keeps_dialog_closed() {
    let mut board = gate_board("PENDIENTE", without_manual()).await;

    let err = board.open_assignment(1).unwrap_err();

    assert_matches!(err, ClientError::Core(CoreError::Precondition(ref m)) if m.contains("Manual de usuario"));
    assert_eq!(board.dialog(), None);
    assert!(!board.card(1).unwrap().documents.ready());
}

#[tokio::test]
async fn assigned_or_failed_defenses_bypass_document_gate() {
    for estado in ["PROGRAMADA", "RECHAZADA"] {
        let mut board = gate_board(estado, without_manual()).await;
        board.open_assignment(1).unwrap();
        assert_eq!(board.dialog(), Some(1), "estado {estado}");
    }
}

#[tokio::test]
async fn complete_documents_open_dialog() {
    let mut board = gate_board("PENDIENTE", all_documents()).await;

    board.open_assignment(1).unwrap();

    assert_eq!(board.dialog(), Some(1));
}

#[tokio::test]
async fn tutors_cannot_open_assignment_dialog() {
    let defenses = Arc::new(FakeDefenses::with_private(vec![record(1, 7, "PRIVADA", "PENDIENTE")]));
    defenses.set_documents(7, all_documents());
    let mut board = PrivateDefenseBoard::new(defenses.clone(), defenses, Role::Tutor);
    board.load().await;

    let err = board.open_assignment(1).unwrap_err();

    assert_matches!(err, ClientError::Core(CoreError::Forbidden(_)));
}

// ---------------------------------------------------------------------------
// Public defenses
// ---------------------------------------------------------------------------

#[tokio::test]
async fn public_defense_unlocks_when_private_passes() {
    let mut graded = record(2, 8, "PRIVADA", "REALIZADA");
    graded.calificacion = Some(Grade(7.5));
    let defenses = Arc::new(FakeDefenses {
        public: vec![
            record(10, 7, "PUBLICA", "PENDIENTE"),
            record(11, 8, "PUBLICA", "PENDIENTE"),
            record(12, 9, "PUBLICA", "PENDIENTE"),
        ]
        .into(),
        ..FakeDefenses::with_private(vec![record(1, 7, "PRIVADA", "APROBADA"), graded])
    });
    let mut board = PublicDefenseBoard::new(defenses);
    board.load().await;

    assert_eq!(board.status(10), Some(DefenseUiStatus::Pending));
    assert_eq!(board.status(11), Some(DefenseUiStatus::Pending));
    assert_eq!(board.status(12), Some(DefenseUiStatus::Locked));
    assert!(board.ensure_unlocked(10).is_ok());
    assert_matches!(
        board.ensure_unlocked(12),
        Err(ClientError::Core(CoreError::Precondition(_)))
    );
    assert_matches!(
        board.ensure_unlocked(99),
        Err(ClientError::Core(CoreError::NotFound { .. }))
    );
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[tokio::test]
async fn marking_read_updates_badge_immediately() {
    let port = Arc::new(FakeNotifications {
        items: vec![notification(1, false), notification(2, false)].into(),
        ..FakeNotifications::default()
    });
    let mut center = NotificationCenter::new(port);
    center.load().await;
    assert_eq!(center.unread(), 2);

    center.mark_read(1).await.unwrap();
    assert_eq!(center.unread(), 1);

    center.delete(2).await.unwrap();
    assert_eq!(center.unread(), 0);
    assert_eq!(center.items().len(), 1);
}

#[tokio::test]
async fn failed_notification_action_restores_server_state() {
    let port = Arc::new(FakeNotifications {
        items: vec![notification(1, false), notification(2, true)].into(),
        reject: true,
        ..FakeNotifications::default()
    });
    let mut center = NotificationCenter::new(port);
    center.load().await;

    assert!(center.mark_all_read().await.is_err());
    assert_eq!(center.unread(), 1);

    assert!(center.delete(1).await.is_err());
    assert_eq!(center.items().len(), 2);
}

#[tokio::test]
async fn poller_publishes_only_changes() {
    let port = Arc::new(FakeNotifications {
        unread: Some(3).into(),
        ..FakeNotifications::default()
    });
    let (poller, mut rx) = NotificationPoller::new(port.clone(), Duration::from_secs(60));
    assert_eq!(*rx.borrow(), None);

    poller.poll_once().await;
    assert!(rx.has_changed().unwrap());
    assert_eq!(*rx.borrow_and_update(), Some(3));

    poller.poll_once().await;
    assert!(!rx.has_changed().unwrap());

    *port.unread.lock().unwrap() = None;
    poller.poll_once().await;
    assert!(!rx.has_changed().unwrap());
    assert_eq!(*rx.borrow(), Some(3));

    *port.unread.lock().unwrap() = Some(0);
    poller.poll_once().await;
    assert_eq!(*rx.borrow_and_update(), Some(0));
}

#[tokio::test]
async fn poller_runs_until_cancelled() {
    let port = Arc::new(FakeNotifications {
        unread: Some(5).into(),
        ..FakeNotifications::default()
    });
    let (poller, mut rx) = NotificationPoller::new(port, Duration::from_millis(10));
    let cancel = CancellationToken::new();
    let task = {
        let cancel = cancel.clone();
        tokio::spawn(async move { poller.run(cancel).await })
    };

    tokio::time::timeout(Duration::from_secs(2), rx.changed())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(*rx.borrow(), Some(5));

    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(2), task)
        .await
        .unwrap()
        .unwrap();
}
