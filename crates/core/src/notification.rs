//! In-app notifications (`/notificaciones`).

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::reconcile::Identified;
use crate::types::{DbId, Timestamp};

/// How often clients refresh the unread counter.
pub const NOTIFICATION_POLL_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: DbId,
    #[serde(default)]
    pub titulo: Option<String>,
    pub mensaje: String,
    #[serde(default)]
    pub leida: bool,
    #[serde(default)]
    pub fecha_creacion: Option<Timestamp>,
    /// Frontend route the notification links to.
    #[serde(default)]
    pub enlace: Option<String>,
}

impl Identified for Notification {
    fn id(&self) -> DbId {
        self.id
    }
}

/// Response of `GET /notificaciones/no-leidas/count`. Accepts both a bare
/// number and `{ "count": n }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum UnreadCountResponse {
    Bare(u64),
    Wrapped { count: u64 },
}

impl UnreadCountResponse {
    pub fn count(self) -> u64 {
        match self {
            Self::Bare(n) | Self::Wrapped { count: n } => n,
        }
    }
}

pub fn unread_count(list: &[Notification]) -> usize {
    list.iter().filter(|n| !n.leida).count()
}

/// Newest first; undated notifications sink to the bottom.
pub fn sort_newest_first(list: &mut [Notification]) {
    list.sort_by(|a, b| b.fecha_creacion.cmp(&a.fecha_creacion));
}
