//! `tesis-notifier` -- unread-notification watcher.
//!
//! Logs in (or reuses the persisted session), then polls the unread
//! notification count and logs every change until Ctrl-C.
//!
//! # Environment variables
//!
//! | Variable                   | Required            | Default                 |
//! |----------------------------|---------------------|-------------------------|
//! | `TESIS_API_URL`            | no                  | `http://localhost:8080` |
//! | `TESIS_API_PREFIX`         | no                  | `/api/v1`               |
//! | `TESIS_SESSION_FILE`       | no                  | `.tesis/session.json`   |
//! | `TESIS_POLL_INTERVAL_SECS` | no                  | `60`                    |
//! | `TESIS_EMAIL`              | without a session   | --                      |
//! | `TESIS_PASSWORD`           | without a session   | --                      |

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tesis_client::poller::NotificationPoller;
use tesis_client::{ApiClient, Backend, ClientConfig, ClientError, SessionHandle, SessionStore};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tesis_client=info,tesis_notifier=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "tesis-notifier stopped");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), ClientError> {
    let config = ClientConfig::from_env()?;
    let session = SessionHandle::load(SessionStore::new(&config.session_file)).await?;
    let backend = Arc::new(Backend::new(ApiClient::new(&config, session.clone())));

    if session.token().await.is_none() {
        let (Ok(email), Ok(password)) = (
            std::env::var("TESIS_EMAIL"),
            std::env::var("TESIS_PASSWORD"),
        ) else {
            return Err(ClientError::Config(
                "No saved session; set TESIS_EMAIL and TESIS_PASSWORD".to_string(),
            ));
        };
        backend.auth.login(&email, &password).await?;
    }

    let user = session.user().await;
    tracing::info!(
        api_url = %config.api_url,
        user = %user.as_ref().map(|u| u.full_name()).unwrap_or_default(),
        interval_secs = config.poll_interval.as_secs(),
        "Starting tesis-notifier",
    );

    let (poller, mut counts) = NotificationPoller::new(backend.clone(), config.poll_interval);
    let cancel = CancellationToken::new();
    let poll_task = {
        let cancel = cancel.clone();
        tokio::spawn(async move { poller.run(cancel).await })
    };

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutdown requested");
                break;
            }
            changed = counts.changed() => {
                if changed.is_err() {
                    break;
                }
                if let Some(unread) = *counts.borrow_and_update() {
                    tracing::info!(unread, "Unread notifications");
                }
            }
        }
    }

    cancel.cancel();
    if let Err(e) = poll_task.await {
        tracing::warn!(error = %e, "Poller task ended abnormally");
    }
    Ok(())
}
