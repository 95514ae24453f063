use async_trait::async_trait;
use std::{
    io,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use tokio::io::AsyncWriteExt;

// 1. StorageService Contract
/// StorageService
///
/// Where accepted uploads end up. The handler only sees this trait, so tests swap
/// the on-disk implementation for `MockStorageService`.
#[async_trait]
pub trait StorageService: Send + Sync {
    /// Creates the upload location if needed. Called once at startup.
    async fn ensure_ready(&self) -> io::Result<()>;

    /// Writes `data` under `name` without overwriting anything and returns the name
    /// actually used. `name` must be a bare file name.
    async fn store(&self, name: &str, data: &[u8]) -> io::Result<String>;

    /// Deletes a previously stored file. Missing files are not an error.
    async fn remove(&self, name: &str) -> io::Result<()>;
}

// 2. The Real Implementation (local filesystem)
/// LocalDiskStorage
///
/// Stores files flat inside one directory, which `ServeDir` exposes under
/// `/static/uploads`.
#[derive(Clone, Debug)]
pub struct LocalDiskStorage {
    root: PathBuf,
}

impl LocalDiskStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

// Upper bound on "-N" suffixes tried when names collide within the same second.
const MAX_NAME_ATTEMPTS: usize = 100;

#[async_trait]
impl StorageService for LocalDiskStorage {
    async fn ensure_ready(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await
    }

    async fn store(&self, name: &str, data: &[u8]) -> io::Result<String> {
        if !is_bare_file_name(name) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("refusing to store {name:?} outside the upload directory"),
            ));
        }

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let candidate = with_suffix(name, attempt);
            let path = self.root.join(&candidate);

            let mut file = match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e),
            };

            file.write_all(data).await?;
            file.flush().await?;
            tracing::debug!(file = %candidate, bytes = data.len(), "upload stored");
            return Ok(candidate);
        }

        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("no free file name for {name:?}"),
        ))
    }

    async fn remove(&self, name: &str) -> io::Result<()> {
        if !is_bare_file_name(name) {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "not a bare file name"));
        }
        match tokio::fs::remove_file(self.root.join(name)).await {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

fn is_bare_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

/// `photo.jpg` -> `photo-1.jpg` for attempt 1. Attempt 0 keeps the name.
fn with_suffix(name: &str, attempt: usize) -> String {
    if attempt == 0 {
        return name.to_string();
    }
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}-{attempt}.{ext}"),
        _ => format!("{name}-{attempt}"),
    }
}

// 3. The Mock Implementation (For Tests)
/// MockStorageService
///
/// Records every stored name and size in memory.
#[derive(Clone, Default)]
pub struct MockStorageService {
    /// When true, every store call fails.
    pub should_fail: bool,
    stored: Arc<Mutex<Vec<(String, usize)>>>,
}

impl MockStorageService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Names stored so far, in order.
    pub fn stored_names(&self) -> Vec<String> {
        self.stored
            .lock()
            .map(|stored| stored.iter().map(|(name, _)| name.clone()).collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl StorageService for MockStorageService {
    async fn ensure_ready(&self) -> io::Result<()> {
        Ok(())
    }

    async fn store(&self, name: &str, data: &[u8]) -> io::Result<String> {
        if self.should_fail {
            return Err(io::Error::other("Mock Storage Error: Simulation requested"));
        }
        if !is_bare_file_name(name) {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "not a bare file name"));
        }
        let mut stored = self
            .stored
            .lock()
            .map_err(|_| io::Error::other("mock storage lock poisoned"))?;
        stored.push((name.to_string(), data.len()));
        Ok(name.to_string())
    }

    async fn remove(&self, name: &str) -> io::Result<()> {
        let mut stored = self
            .stored
            .lock()
            .map_err(|_| io::Error::other("mock storage lock poisoned"))?;
        stored.retain(|(stored_name, _)| stored_name != name);
        Ok(())
    }
}

/// StorageState
///
/// The concrete type used to share the storage service across the application state.
pub type StorageState = Arc<dyn StorageService>;
