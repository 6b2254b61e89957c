use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::color::Color;
use crate::config::{app_data_path, data_env_dirs, APP_DIR};
use crate::export::ExportArtifact;

pub const RECENT_COLORS_KEY: &str = "recentColors";
pub const MAX_RECENT_COLORS: usize = 10;
const STORAGE_FILE: &str = "storage.json";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("missing HOME environment variable")]
    MissingHomeDirectory,
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("stored data is not valid json: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// String-keyed persistence for small client-side values.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn set(&mut self, key: &str, value: String) -> StorageResult<()>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> StorageResult<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// All keys in one JSON object on disk; every write rewrites the file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub const fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn with_default_path() -> StorageResult<Self> {
        let (xdg_data_home, home) = data_env_dirs();
        let path = app_data_path(APP_DIR, STORAGE_FILE, xdg_data_home.as_deref(), home.as_deref())
            .map_err(|_| StorageError::MissingHomeDirectory)?;
        Ok(Self::with_path(path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> StorageResult<BTreeMap<String, String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(StorageError::Io(err)),
        }
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: String) -> StorageResult<()> {
        let mut values = match self.read_all() {
            Ok(values) => values,
            Err(StorageError::Json(err)) => {
                tracing::warn!(?err, path = %self.path.display(), "replacing corrupt storage file");
                BTreeMap::new()
            }
            Err(err) => return Err(err),
        };
        values.insert(key.to_string(), value);

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&values)?)?;
        Ok(())
    }
}

/// Most-recently-selected colors, newest first, without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecentColors {
    colors: Vec<Color>,
}

impl RecentColors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the persisted list; anything unreadable yields an empty list.
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        let raw = match store.get(RECENT_COLORS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Self::new(),
            Err(err) => {
                tracing::warn!(%err, "failed to read recent colors; starting empty");
                return Self::new();
            }
        };
        let values: Vec<String> = match serde_json::from_str(&raw) {
            Ok(values) => values,
            Err(err) => {
                tracing::warn!(%err, "ignoring corrupt recent colors");
                return Self::new();
            }
        };

        let mut recent = Self::new();
        for value in values.iter().rev() {
            match Color::from_hex(value) {
                Ok(color) => {
                    recent.push(color);
                }
                Err(err) => tracing::warn!(%err, "skipping stored recent color"),
            }
        }
        recent
    }

    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S) -> StorageResult<()> {
        let values = self.colors.iter().map(|color| color.to_hex()).collect::<Vec<_>>();
        store.set(RECENT_COLORS_KEY, serde_json::to_string(&values)?)
    }

    /// Moves `color` to the front. Returns whether the list changed.
    pub fn push(&mut self, color: Color) -> bool {
        if self.colors.first() == Some(&color) {
            return false;
        }
        self.colors.retain(|existing| *existing != color);
        self.colors.insert(0, color);
        self.colors.truncate(MAX_RECENT_COLORS);
        true
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

/// Where finished exports land, each under its fixed file name.
#[derive(Debug, Clone)]
pub struct DownloadDirectory {
    dir: PathBuf,
}

impl DownloadDirectory {
    pub const fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn current_dir() -> StorageResult<Self> {
        Ok(Self::new(std::env::current_dir()?))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn target_path(&self, artifact: &ExportArtifact) -> PathBuf {
        self.dir.join(artifact.file_name())
    }

    /// Writes the artifact, replacing any earlier download of the same format.
    pub fn save(&self, artifact: &ExportArtifact) -> StorageResult<PathBuf> {
        let target = self.target_path(artifact);
        save_overwrite(&artifact.bytes, &target)?;
        tracing::info!(
            path = %target.display(),
            mime = artifact.mime_type(),
            bytes = artifact.bytes.len(),
            "saved export"
        );
        Ok(target)
    }
}

fn save_overwrite<D: AsRef<Path>>(bytes: &[u8], destination: D) -> StorageResult<()> {
    let destination = destination.as_ref();

    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)?;
    }

    let _ = fs::remove_file(destination);
    fs::write(destination, bytes)?;
    Ok(())
}
