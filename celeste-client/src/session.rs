use anyhow::{Context, Result};
use celeste_types::{Viewer, ViewerId};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Session data persisted between runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    pub viewer: Viewer,
    #[serde(default)]
    pub session_token: Option<String>,
}

/// Shared handle to the currently authenticated viewer.
///
/// Created once per session and handed to every coordinator at construction.
/// It is hydrated when the session starts and cleared at logout; clones share
/// the same underlying slot, so a logout is observed by every coordinator.
#[derive(Debug, Clone, Default)]
pub struct ViewerContext {
    inner: Arc<RwLock<Option<Viewer>>>,
}

impl ViewerContext {
    /// An anonymous context; mutating operations fail until it is hydrated
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn signed_in(viewer: Viewer) -> Self {
        let context = Self::default();
        context.hydrate(viewer);
        context
    }

    pub fn hydrate(&self, viewer: Viewer) {
        log::info!("Viewer session hydrated for @{}", viewer.handle);
        *self.inner.write().unwrap_or_else(|e| e.into_inner()) = Some(viewer);
    }

    pub fn clear(&self) {
        log::info!("Viewer session cleared");
        *self.inner.write().unwrap_or_else(|e| e.into_inner()) = None;
    }

    /// The current viewer, if one is signed in with a non-empty handle
    pub fn current(&self) -> Option<Viewer> {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .filter(Viewer::is_signed_in)
    }

    pub fn handle(&self) -> Option<ViewerId> {
        self.current().map(|viewer| viewer.handle)
    }

    pub fn is_signed_in(&self) -> bool {
        self.current().is_some()
    }
}

/// Manages session storage in the user's home directory.
///
/// The session is stored in `~/.celeste/session.json` with 0600 permissions
/// so only the owner can read/write the file.
#[derive(Debug, Clone)]
pub struct SessionStore {
    file_path: PathBuf,
}

impl SessionStore {
    /// Creates a new SessionStore with the default path `~/.celeste/session.json`.
    pub fn new() -> Result<Self> {
        let dir = crate::config::ConfigManager::default_config_dir()?;
        Ok(Self::at(dir.join("session.json")))
    }

    pub fn at(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Loads the session from the file.
    ///
    /// A missing file, an empty file or one holding a viewer without a handle
    /// all mean "no session". Unparseable content is an error.
    pub fn load(&self) -> Result<Option<SessionData>> {
        if !self.file_path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.file_path).context("Failed to read session file")?;

        if content.trim().is_empty() {
            log::warn!("Session file is empty, treating as no session");
            return Ok(None);
        }

        let session: SessionData =
            serde_json::from_str(&content).context("Failed to parse session file")?;

        if !session.viewer.is_signed_in() {
            log::warn!("Session file has no viewer handle, treating as no session");
            return Ok(None);
        }

        log::debug!("Loaded session from {}", self.file_path.display());
        Ok(Some(session))
    }

    /// Saves the session with an atomic write and 0600 permissions.
    pub fn save(&self, session: &SessionData) -> Result<()> {
        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent).context("Failed to create .celeste directory")?;
        }

        let json =
            serde_json::to_string_pretty(session).context("Failed to serialize session data")?;

        let temp_path = self.file_path.with_extension("tmp");

        let mut file =
            fs::File::create(&temp_path).context("Failed to create temporary session file")?;
        file.write_all(json.as_bytes())
            .context("Failed to write session data")?;
        file.sync_all()
            .context("Failed to sync session file to disk")?;
        drop(file);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = fs::Permissions::from_mode(0o600);
            fs::set_permissions(&temp_path, permissions)
                .context("Failed to set session file permissions")?;
        }

        fs::rename(&temp_path, &self.file_path)
            .context("Failed to rename temporary session file")?;

        log::info!("Saved session to {}", self.file_path.display());
        Ok(())
    }

    /// Deletes the session file. Returns `Ok(())` even if the file doesn't exist.
    pub fn delete(&self) -> Result<()> {
        if self.file_path.exists() {
            fs::remove_file(&self.file_path).context("Failed to delete session file")?;
            log::info!("Deleted session file at {}", self.file_path.display());
        }
        Ok(())
    }

    /// Session start: hydrate `context` from disk. Returns whether a viewer was found.
    pub fn restore_into(&self, context: &ViewerContext) -> Result<bool> {
        match self.load()? {
            Some(session) => {
                context.hydrate(session.viewer);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Logout: clear `context` and forget the persisted session
    pub fn logout(&self, context: &ViewerContext) -> Result<()> {
        context.clear();
        self.delete()
    }
}
