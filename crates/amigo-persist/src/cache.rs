//! Local profile cache kept next to the primary store.
//!
//! Writes here are secondary: callers log and surface failures but never
//! fail the operation that triggered them.

use std::path::{Path, PathBuf};

use amigo_types::ProfileDetails;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;

use crate::error::{PersistError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActivityKind {
    ProfileCreate,
    CoursePlanCreate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
    pub id: String,
    pub user_id: String,
    pub kind: ActivityKind,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

impl ActivityRecord {
    pub fn new(user_id: impl Into<String>, kind: ActivityKind, title: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            kind,
            title: title.into(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedProfile {
    pub user_id: String,
    #[serde(flatten)]
    pub details: ProfileDetails,
    pub avatar_fallback: String,
    pub updated_at: DateTime<Utc>,
}

impl CachedProfile {
    pub fn new(user_id: impl Into<String>, details: ProfileDetails) -> Self {
        let avatar_fallback = details.avatar_fallback();
        Self {
            user_id: user_id.into(),
            details,
            avatar_fallback,
            updated_at: Utc::now(),
        }
    }
}

#[async_trait]
pub trait ProfileCache: Send + Sync {
    async fn save_profile(&self, profile: &CachedProfile) -> Result<()>;

    async fn load_profile(&self, user_id: &str) -> Result<Option<CachedProfile>>;

    async fn record_activity(&self, activity: &ActivityRecord) -> Result<()>;

    /// Activities of a user in the order they were recorded
    async fn list_activities(&self, user_id: &str) -> Result<Vec<ActivityRecord>>;
}

/// Cache backed by a directory: one JSON file per profile and an
/// append-only `activities.jsonl`
#[derive(Debug, Clone)]
pub struct FileProfileCache {
    dir: PathBuf,
}

impl FileProfileCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Hex of the user id, so distinct ids never share a file
    fn profile_path(&self, user_id: &str) -> PathBuf {
        self.dir
            .join("profiles")
            .join(format!("{}.json", hex::encode(user_id.as_bytes())))
    }

    fn activities_path(&self) -> PathBuf {
        self.dir.join("activities.jsonl")
    }
}

fn io_error(path: &Path, err: std::io::Error) -> PersistError {
    PersistError::Cache(format!("{}: {}", path.display(), err))
}

#[async_trait]
impl ProfileCache for FileProfileCache {
    async fn save_profile(&self, profile: &CachedProfile) -> Result<()> {
        let path = self.profile_path(&profile.user_id);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error(parent, e))?;
        }
        let body = serde_json::to_vec_pretty(profile)?;
        tokio::fs::write(&path, body).await.map_err(|e| io_error(&path, e))?;

        tracing::debug!(user_id = %profile.user_id, path = %path.display(), "Cached profile");
        Ok(())
    }

    async fn load_profile(&self, user_id: &str) -> Result<Option<CachedProfile>> {
        let path = self.profile_path(user_id);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(&path, e)),
        }
    }

    async fn record_activity(&self, activity: &ActivityRecord) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| io_error(&self.dir, e))?;

        let path = self.activities_path();
        let mut line = serde_json::to_vec(activity)?;
        line.push(b'\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| io_error(&path, e))?;
        file.write_all(&line).await.map_err(|e| io_error(&path, e))?;
        file.flush().await.map_err(|e| io_error(&path, e))?;
        Ok(())
    }

    async fn list_activities(&self, user_id: &str) -> Result<Vec<ActivityRecord>> {
        let path = self.activities_path();
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error(&path, e)),
        };

        let mut activities = Vec::new();
        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            let record: ActivityRecord = serde_json::from_str(line)?;
            if record.user_id == user_id {
                activities.push(record);
            }
        }
        Ok(activities)
    }
}
