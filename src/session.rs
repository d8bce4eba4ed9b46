//! Session management for the Telegram client
//!
//! Provides:
//! - File-based session locking to prevent parallel execution
//! - Session file validation
//! - Client creation from the configured credentials

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use fs2::FileExt;
use grammers_client::Client;
use grammers_mtsender::{SenderPool, SenderPoolHandle};
use grammers_session::storages::SqliteSession;
use tokio::sync::mpsc;

use crate::config::Config;
use crate::error::{Error, Result};

/// Session lock guard that ensures exclusive access to the Telegram session.
pub struct SessionLock {
    path: PathBuf,
    lock_file: Option<File>,
}

impl SessionLock {
    /// Acquire an exclusive lock on the session.
    pub fn acquire(config: &Config) -> Result<Self> {
        Self::acquire_at(&config.lock_file)
    }

    /// Acquire an exclusive lock using an explicit lock file path.
    pub fn acquire_at<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let lock_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .map_err(|e| Error::LockError(format!("Failed to open lock file: {}", e)))?;

        match lock_file.try_lock_exclusive() {
            Ok(()) => Ok(Self {
                path,
                lock_file: Some(lock_file),
            }),
            Err(_) => {
                tracing::error!(
                    lock = %path.display(),
                    "Telegram session is already in use by another process; wait for it to finish"
                );
                Err(Error::SessionLocked)
            }
        }
    }

    /// Release the lock manually
    pub fn release(&mut self) {
        if let Some(file) = self.lock_file.take() {
            let _ = file.unlock();
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

impl Drop for SessionLock {
    fn drop(&mut self) {
        self.release();
    }
}

/// Check that the session file exists.
pub fn check_session_exists(config: &Config) -> Result<()> {
    let session_file = config.session_file();

    if !session_file.exists() {
        tracing::error!(
            session = %session_file.display(),
            "Session file not found; create it first with `cargo run --bin init_session`"
        );
        return Err(Error::SessionNotFound(
            session_file.to_string_lossy().to_string(),
        ));
    }

    Ok(())
}

/// Open (or create) the SQLite session file.
pub fn open_session(config: &Config) -> Result<Arc<SqliteSession>> {
    let session_file = config.session_file();
    let session = SqliteSession::open(&session_file)
        .map_err(|e| Error::SessionNotFound(format!("Failed to open session: {}", e)))?;
    Ok(Arc::new(session))
}

/// Holder for SenderPool components and Client
pub struct TelegramClient {
    pub client: Client,
    pub handle: SenderPoolHandle,
    _updates_handle: tokio::task::JoinHandle<usize>,
    _runner_handle: tokio::task::JoinHandle<()>,
}

impl TelegramClient {
    /// Create a new TelegramClient from session
    pub async fn connect(config: &Config, session: Arc<SqliteSession>) -> Result<Self> {
        let pool = SenderPool::new(session, config.api_id);

        // Client borrows the whole pool, so build it before splitting
        let client = Client::new(&pool);

        let SenderPool {
            runner,
            updates,
            handle,
        } = pool;

        let runner_handle = tokio::spawn(async move {
            runner.run().await;
        });

        Ok(Self {
            client,
            handle,
            _updates_handle: drain_updates(updates),
            _runner_handle: runner_handle,
        })
    }
}

/// Discard pushed updates so they do not queue up while the history is scanned.
///
/// Resolves to the number of discarded updates once the sender side closes.
pub fn drain_updates<T: Send + 'static>(
    mut updates: mpsc::UnboundedReceiver<T>,
) -> tokio::task::JoinHandle<usize> {
    tokio::spawn(async move {
        let mut discarded = 0;
        while updates.recv().await.is_some() {
            discarded += 1;
        }
        tracing::debug!("Update stream closed after {} updates", discarded);
        discarded
    })
}

impl std::ops::Deref for TelegramClient {
    type Target = Client;

    fn deref(&self) -> &Self::Target {
        &self.client
    }
}

/// Create and connect a Telegram client with an existing, authorized session.
pub async fn get_client(config: &Config) -> Result<TelegramClient> {
    config.require_credentials()?;
    check_session_exists(config)?;
    let session = open_session(config)?;
    let client = TelegramClient::connect(config, session).await?;

    if !client.is_authorized().await? {
        return Err(Error::AuthorizationRequired);
    }

    Ok(client)
}

/// Create a Telegram client for initialization (no session check).
pub async fn get_client_for_init(config: &Config) -> Result<TelegramClient> {
    config.require_credentials()?;
    let session = open_session(config)?;
    TelegramClient::connect(config, session).await
}
