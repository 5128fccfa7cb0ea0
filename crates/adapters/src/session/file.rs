// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session records stored as one JSON file per session

use super::{SessionManager, SessionManagerError};
use crate::registry::PluginRegistry;
use ao_core::{Clock, Session, SessionId, SessionStatus, SystemClock};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Session manager over `<dir>/<session-id>.json` records.
///
/// Messages are routed to the runtime plugin named by the session's
/// runtime handle. Record updates are written to a temp file and renamed
/// into place so readers never see a partial record.
pub struct FileSessionManager<C: Clock = SystemClock> {
    dir: PathBuf,
    registry: PluginRegistry,
    clock: C,
}

impl FileSessionManager<SystemClock> {
    pub fn new(dir: impl Into<PathBuf>, registry: PluginRegistry) -> Self {
        Self::with_clock(dir, registry, SystemClock)
    }
}

impl<C: Clock> FileSessionManager<C> {
    pub fn with_clock(dir: impl Into<PathBuf>, registry: PluginRegistry, clock: C) -> Self {
        Self {
            dir: dir.into(),
            registry,
            clock,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, id: &SessionId) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }

    /// Create or replace a session record.
    pub async fn save(&self, session: &Session) -> Result<(), SessionManagerError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| io_error(&self.dir, source))?;
        let path = self.record_path(&session.id);
        let json = serde_json::to_vec_pretty(session).map_err(|source| {
            SessionManagerError::Corrupt {
                path: path.clone(),
                source,
            }
        })?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|source| io_error(&tmp, source))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|source| io_error(&path, source))
    }

    async fn read(&self, path: &Path) -> Result<Session, SessionManagerError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| io_error(path, source))?;
        serde_json::from_slice(&bytes).map_err(|source| SessionManagerError::Corrupt {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[async_trait]
impl<C: Clock> SessionManager for FileSessionManager<C> {
    async fn list(&self) -> Result<Vec<Session>, SessionManagerError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(io_error(&self.dir, source)),
        };

        let mut sessions = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|source| io_error(&self.dir, source))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match self.read(&path).await {
                Ok(session) => sessions.push(session),
                // A record deleted between read_dir and read is simply gone.
                Err(SessionManagerError::Io { source, .. })
                    if source.kind() == ErrorKind::NotFound => {}
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping session record"),
            }
        }
        sessions.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(sessions)
    }

    async fn get(&self, id: &SessionId) -> Result<Option<Session>, SessionManagerError> {
        match self.read(&self.record_path(id)).await {
            Ok(session) => Ok(Some(session)),
            Err(SessionManagerError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn send(&self, id: &SessionId, message: &str) -> Result<(), SessionManagerError> {
        let session = self
            .get(id)
            .await?
            .ok_or_else(|| SessionManagerError::NotFound(id.clone()))?;
        let handle = session
            .runtime_handle
            .as_ref()
            .ok_or_else(|| SessionManagerError::NoRuntimeHandle(id.clone()))?;
        let runtime = self
            .registry
            .runtime(&handle.runtime)
            .ok_or_else(|| SessionManagerError::UnknownRuntime(handle.runtime.clone()))?;
        runtime.send_message(handle, message).await?;
        Ok(())
    }

    async fn update_status(
        &self,
        id: &SessionId,
        status: SessionStatus,
    ) -> Result<(), SessionManagerError> {
        let mut session = self
            .get(id)
            .await?
            .ok_or_else(|| SessionManagerError::NotFound(id.clone()))?;
        session.status = status;
        session.updated_at = self.clock.now();
        self.save(&session).await
    }
}

fn io_error(path: &Path, source: std::io::Error) -> SessionManagerError {
    SessionManagerError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
#[path = "file_tests.rs"]
mod tests;
