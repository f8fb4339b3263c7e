//! Local player identity.
//!
//! Each profile keeps one opaque id on disk so the server recognises the same
//! player across restarts and reconnects.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ClientError, Result};

/// Opaque player identity. Generated client-side; the server only compares it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn generate() -> Self {
        PlayerId(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PlayerId {
    fn from(s: &str) -> Self {
        PlayerId(s.to_string())
    }
}

impl From<String> for PlayerId {
    fn from(s: String) -> Self {
        PlayerId(s)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// OS-standard data directory for this client.
pub fn data_dir() -> Result<PathBuf> {
    ProjectDirs::from("", "", "tictaclive")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| ClientError::Config("could not determine a home directory".into()))
}

fn id_path(dir: &Path, profile: &str) -> PathBuf {
    dir.join(format!("{profile}.id"))
}

/// Reads the id stored for `profile` under `dir`, creating one if missing.
pub fn load_or_create(dir: &Path, profile: &str) -> Result<PlayerId> {
    if profile.is_empty() || !profile.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(ClientError::Config(format!("invalid profile name {profile:?}")));
    }

    let path = id_path(dir, profile);
    match fs::read_to_string(&path) {
        Ok(contents) if !contents.trim().is_empty() => {
            debug!(path = %path.display(), "loaded player id");
            return Ok(PlayerId(contents.trim().to_string()));
        }
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    fs::create_dir_all(dir)?;
    let id = PlayerId::generate();
    fs::write(&path, id.as_str())?;
    info!(path = %path.display(), %id, "created new player id");
    Ok(id)
}
