//! Persisted session storage.
//!
//! The store keeps the session as four flat keys (`token`, `id`, `role`,
//! `status`) in a key/value backend so the layout matches what the backend
//! and the OAuth redirect speak. A write replaces the whole record at once. A
//! reader that finds any key missing, or the record unreadable, treats the
//! session as absent and removes the leftovers, so a torn record is never
//! observed as a session.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use super::{ApprovalStatus, Role, Session};
use crate::error::StoreError;

/// Session file name inside the config directory.
const SESSION_FILE: &str = "session.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKey {
    Token,
    Id,
    Role,
    Status,
}

impl SessionKey {
    /// Write order. Token goes first so a half-written session never carries
    /// a role or status without a credential.
    pub const ALL: [SessionKey; 4] = [
        SessionKey::Token,
        SessionKey::Id,
        SessionKey::Role,
        SessionKey::Status,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKey::Token => "token",
            SessionKey::Id => "id",
            SessionKey::Role => "role",
            SessionKey::Status => "status",
        }
    }
}

/// Legacy member identifier key some screens used. Never written; removed on clear.
const LEGACY_USER_ID_KEY: &str = "userId";
const WRITTEN_AT_KEY: &str = "writtenAt";

/// Flat string storage the session is persisted into.
///
/// The `*_many` operations apply to the whole record at once; backends shared
/// between processes must make them atomic.
pub trait KeyValueBackend: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;

    fn get_many(&self, keys: &[&str]) -> Result<Vec<Option<String>>, StoreError> {
        keys.iter().map(|key| self.get(key)).collect()
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StoreError> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }

    fn remove_many(&self, keys: &[&str]) -> Result<(), StoreError> {
        for key in keys {
            self.remove(key)?;
        }
        Ok(())
    }
}

/// In-process backend; nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> Result<MutexGuard<'_, BTreeMap<String, String>>, StoreError> {
        self.entries.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl KeyValueBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries()?.remove(key);
        Ok(())
    }

    fn get_many(&self, keys: &[&str]) -> Result<Vec<Option<String>>, StoreError> {
        let entries = self.entries()?;
        Ok(keys.iter().map(|key| entries.get(*key).cloned()).collect())
    }

    fn set_many(&self, pairs: &[(&str, &str)]) -> Result<(), StoreError> {
        let mut entries = self.entries()?;
        for (key, value) in pairs {
            entries.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }

    fn remove_many(&self, keys: &[&str]) -> Result<(), StoreError> {
        let mut entries = self.entries()?;
        for key in keys {
            entries.remove(*key);
        }
        Ok(())
    }
}

/// JSON map on disk, written with 0600 permissions on unix.
///
/// Every change loads the map once and replaces the file through a rename,
/// so other processes see either the old record or the new one.
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backend rooted in a config directory, using the standard file name.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(SESSION_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StoreError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = fs::read_to_string(&self.path).map_err(|source| self.io_error(source))?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
            path: self.path.display().to_string(),
            source,
        })
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if entries.is_empty() {
            return self.delete();
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }

        let content = serde_json::to_string_pretty(entries).map_err(|source| StoreError::Corrupt {
            path: self.path.display().to_string(),
            source,
        })?;

        let staging = self.staging_path();
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let written = options
            .open(&staging)
            .and_then(|mut file| {
                file.write_all(content.as_bytes())?;
                file.sync_all()
            })
            .and_then(|_| fs::rename(&staging, &self.path));
        if let Err(source) = written {
            let _ = fs::remove_file(&staging);
            return Err(self.io_error(source));
        }
        Ok(())
    }

    fn delete(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(self.io_error(source)),
        }
    }

    // unique per process so concurrent writers never share a staging file
    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| SESSION_FILE.into());
        name.push(format!(".{}.tmp", std::process::id()));
        self.path.with_file_name(name)
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

impl KeyValueBackend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.set_many(&[(key, value)])
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.remove_many(&[key])
    }

    fn get_many(&self, keys: &[&str]) -> Result<Vec<Option<String>>, StoreError> {
        let mut entries = self.load()?;
        Ok(keys.iter().map(|key| entries.remove(*key)).collect())
    }

    fn set_many(&self, pairs: &[(&str, &str)]) -> Result<(), StoreError> {
        // an unreadable file holds nothing worth keeping
        let mut entries = match self.load() {
            Err(StoreError::Corrupt { .. }) => BTreeMap::new(),
            other => other?,
        };
        for (key, value) in pairs {
            entries.insert(key.to_string(), value.to_string());
        }
        self.save(&entries)
    }

    fn remove_many(&self, keys: &[&str]) -> Result<(), StoreError> {
        let mut entries = match self.load() {
            Ok(entries) => entries,
            Err(StoreError::Corrupt { path, .. }) => {
                tracing::warn!("Removing unreadable session file {}", path);
                return self.delete();
            }
            Err(e) => return Err(e),
        };

        let before = entries.len();
        for key in keys {
            entries.remove(*key);
        }
        if entries.len() == before {
            return Ok(());
        }
        self.save(&entries)
    }
}

/// The one shared mutable resource of the portal.
///
/// Reads, writes and clears are serialized: one at a time, later write wins.
/// Each of them touches the backend as one whole-record operation.
pub struct TokenStore {
    backend: Box<dyn KeyValueBackend>,
    write_lock: Mutex<()>,
}

impl TokenStore {
    pub fn new(backend: impl KeyValueBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            write_lock: Mutex::new(()),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    /// Persist every field of the session, in fixed order.
    pub fn write(&self, session: &Session) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;

        let written_at = Utc::now().to_rfc3339();
        let mut entries: Vec<(&str, &str)> = SessionKey::ALL
            .iter()
            .map(|key| {
                let value = match key {
                    SessionKey::Token => session.token.as_str(),
                    SessionKey::Id => session.member_id.as_str(),
                    SessionKey::Role => session.role.as_str(),
                    SessionKey::Status => session.approval_status.as_str(),
                };
                (key.as_str(), value)
            })
            .collect();
        entries.push((WRITTEN_AT_KEY, written_at.as_str()));
        self.backend.set_many(&entries)?;

        tracing::debug!(
            "Session stored for member {} ({}, {})",
            session.member_id,
            session.role,
            session.approval_status
        );
        Ok(())
    }

    /// Current session, or `None` when anonymous.
    ///
    /// A partial, unparseable or unreadable record is cleared before
    /// returning `None`.
    pub fn read(&self) -> Result<Option<Session>, StoreError> {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;

        let keys = SessionKey::ALL.map(|key| key.as_str());
        let values = match self.backend.get_many(&keys) {
            Ok(values) => values,
            Err(StoreError::Corrupt { path, source }) => {
                tracing::warn!("Discarding unreadable stored session in {}: {}", path, source);
                self.remove_all()?;
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let present = values.iter().filter(|v| v.is_some()).count();
        if present == 0 {
            return Ok(None);
        }

        let parsed = match values.as_slice() {
            [Some(token), Some(id), Some(role), Some(status)] => {
                match (role.parse::<Role>(), status.parse::<ApprovalStatus>()) {
                    (Ok(role), Ok(status)) => {
                        Some(Session::new(token.as_str(), id.as_str(), role, status))
                    }
                    _ => None,
                }
            }
            _ => None,
        };

        if parsed.is_none() {
            tracing::warn!("Discarding incomplete stored session ({present} of 4 fields present)");
            self.remove_all()?;
        }
        Ok(parsed)
    }

    /// Remove every session key. Idempotent.
    pub fn clear(&self) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;
        self.remove_all()?;

        tracing::debug!("Session cleared");
        Ok(())
    }

    // caller holds write_lock
    fn remove_all(&self) -> Result<(), StoreError> {
        let mut keys: Vec<&str> = SessionKey::ALL.iter().map(|key| key.as_str()).collect();
        keys.extend([LEGACY_USER_ID_KEY, WRITTEN_AT_KEY]);
        self.backend.remove_many(&keys)
    }

    /// When the current session was written, if known.
    pub fn written_at(&self) -> Result<Option<DateTime<Utc>>, StoreError> {
        Ok(self
            .backend
            .get(WRITTEN_AT_KEY)?
            .and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok())
            .map(|dt| dt.with_timezone(&Utc)))
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Session {
        Session::new("abc", "1", Role::Member, ApprovalStatus::Pending)
    }

    #[test]
    fn read_after_write_round_trips() {
        let store = TokenStore::in_memory();
        store.write(&sample()).unwrap();
        assert_eq!(store.read().unwrap(), Some(sample()));
        assert!(store.written_at().unwrap().is_some());
    }

    #[test]
    fn read_after_clear_is_anonymous() {
        let store = TokenStore::in_memory();
        store.write(&sample()).unwrap();
        store.clear().unwrap();
        assert_eq!(store.read().unwrap(), None);
        // clearing twice is harmless
        store.clear().unwrap();
        assert_eq!(store.read().unwrap(), None);
    }

    #[test]
    fn partial_record_reads_as_anonymous_and_heals() {
        let backend = MemoryBackend::new();
        backend.set("token", "abc").unwrap();
        backend.set("role", "ADMIN").unwrap();
        let store = TokenStore::new(backend);

        assert_eq!(store.read().unwrap(), None);
        assert_eq!(store.backend.get("token").unwrap(), None);
        assert_eq!(store.backend.get("role").unwrap(), None);
    }

    #[test]
    fn unparseable_status_reads_as_anonymous() {
        let store = TokenStore::in_memory();
        store.write(&sample()).unwrap();
        store.backend.set("status", "ARCHIVED").unwrap();
        assert_eq!(store.read().unwrap(), None);
    }

    #[test]
    fn legacy_user_id_is_ignored_and_cleared() {
        let backend = MemoryBackend::new();
        backend.set("userId", "7").unwrap();
        let store = TokenStore::new(backend);
        assert_eq!(store.read().unwrap(), None);

        store.clear().unwrap();
        assert_eq!(store.backend.get("userId").unwrap(), None);
    }

    #[test]
    fn later_write_wins() {
        let store = TokenStore::in_memory();
        store.write(&sample()).unwrap();
        let admin = Session::new("xyz", "2", Role::Admin, ApprovalStatus::Approved);
        store.write(&admin).unwrap();
        assert_eq!(store.read().unwrap(), Some(admin));
    }

    #[test]
    fn file_backend_survives_reopen() {
        let dir = std::env::temp_dir().join(format!(
            "portal-store-{}-{}",
            std::process::id(),
            Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        let store = TokenStore::new(FileBackend::in_dir(&dir));
        store.write(&sample()).unwrap();
        drop(store);

        let reopened = TokenStore::new(FileBackend::in_dir(&dir));
        assert_eq!(reopened.read().unwrap(), Some(sample()));
        reopened.clear().unwrap();
        assert_eq!(reopened.read().unwrap(), None);

        let _ = fs::remove_dir_all(&dir);
    }
    fn temp_dir(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "portal-store-{}-{}-{}",
            label,
            std::process::id(),
            Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ))
    }

    #[test]
    fn unreadable_file_reads_as_anonymous_and_is_removed() {
        let dir = temp_dir("corrupt-read");
        fs::create_dir_all(&dir).unwrap();
        let backend = FileBackend::in_dir(&dir);
        fs::write(backend.path(), r#"{"token":"ab"#).unwrap();
        let path = backend.path().to_path_buf();
        let store = TokenStore::new(backend);

        assert_eq!(store.read().unwrap(), None);
        assert!(!path.exists());

        store.write(&sample()).unwrap();
        assert_eq!(store.read().unwrap(), Some(sample()));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn clear_succeeds_on_unreadable_file() {
        let dir = temp_dir("corrupt-clear");
        fs::create_dir_all(&dir).unwrap();
        let backend = FileBackend::in_dir(&dir);
        fs::write(backend.path(), "not json").unwrap();
        let path = backend.path().to_path_buf();
        let store = TokenStore::new(backend);

        store.clear().unwrap();
        assert!(!path.exists());
        store.clear().unwrap();

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn write_replaces_unreadable_file() {
        let dir = temp_dir("corrupt-write");
        fs::create_dir_all(&dir).unwrap();
        let backend = FileBackend::in_dir(&dir);
        fs::write(backend.path(), "{").unwrap();
        let store = TokenStore::new(backend);

        store.write(&sample()).unwrap();
        assert_eq!(store.read().unwrap(), Some(sample()));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn separate_stores_on_one_file_see_whole_records() {
        let dir = temp_dir("shared");
        let writer = TokenStore::new(FileBackend::in_dir(&dir));
        let reader = TokenStore::new(FileBackend::in_dir(&dir));

        writer.write(&sample()).unwrap();
        assert_eq!(reader.read().unwrap(), Some(sample()));

        let admin = Session::new("xyz", "2", Role::Admin, ApprovalStatus::Approved);
        writer.write(&admin).unwrap();
        assert_eq!(reader.read().unwrap(), Some(admin.clone()));
        assert_eq!(writer.read().unwrap(), Some(admin));

        let leftovers: Vec<_> = fs::read_dir(&dir)
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn write_is_one_record_operation() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        struct Counting {
            inner: MemoryBackend,
            single_sets: Arc<AtomicUsize>,
        }

        impl KeyValueBackend for Counting {
            fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
                self.inner.get(key)
            }
            fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
                self.single_sets.fetch_add(1, Ordering::SeqCst);
                self.inner.set(key, value)
            }
            fn remove(&self, key: &str) -> Result<(), StoreError> {
                self.inner.remove(key)
            }
            fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StoreError> {
                self.inner.set_many(entries)
            }
        }

        let single_sets = Arc::new(AtomicUsize::new(0));
        let store = TokenStore::new(Counting {
            inner: MemoryBackend::new(),
            single_sets: single_sets.clone(),
        });

        store.write(&sample()).unwrap();
        assert_eq!(single_sets.load(Ordering::SeqCst), 0);
        assert_eq!(store.read().unwrap(), Some(sample()));
    }
}
