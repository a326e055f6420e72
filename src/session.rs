//! Session-scoped handoff between the capture screen and the collage screen.
//!
//! The capture controller writes two well-known keys into a small key-value
//! store; the collage view reads them once on load. There is no versioning,
//! and a missing or malformed entry reads as "zero photos" rather than an
//! error.
//!
//! # Keys
//!
//! | Key | Value |
//! |-----|-------|
//! | `photos` | JSON array of `data:` URIs |
//! | `photoFilter` | filter CSS class, `""` for none |

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use crate::error::{BoothError, Result, ResultExt};
use crate::style::{Filter, StyleAxis};

/// Storage key for the captured photos.
pub const PHOTOS_KEY: &str = "photos";
/// Storage key for the filter chosen while capturing.
pub const FILTER_KEY: &str = "photoFilter";

// === Views ===

/// Navigable views of the booth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    Landing,
    PhotoBooth,
    Result,
}

impl View {
    pub const fn path(self) -> &'static str {
        match self {
            Self::Landing => "/",
            Self::PhotoBooth => "/photo-booth",
            Self::Result => "/photo-booth/result",
        }
    }
}

// === Snapshots ===

/// Opaque handle of a captured snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SnapshotId(Uuid);

impl SnapshotId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One captured still image.
///
/// Immutable once created; the encoded bytes are shared, never copied, when
/// the snapshot is cloned into a render tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    id: SnapshotId,
    position: usize,
    mime: String,
    data: Arc<[u8]>,
}

impl Snapshot {
    /// Wrap encoded image bytes captured at `position`.
    pub fn new(position: usize, mime: impl Into<String>, data: impl Into<Arc<[u8]>>) -> Self {
        Self {
            id: SnapshotId::new(),
            position,
            mime: mime.into(),
            data: data.into(),
        }
    }

    /// Decode a `data:<mime>;base64,<payload>` URI.
    pub fn from_data_uri(position: usize, uri: &str) -> Result<Self> {
        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| BoothError::InvalidPhoto("missing data: scheme".to_string()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| BoothError::InvalidPhoto("missing payload separator".to_string()))?;
        let mime = header
            .strip_suffix(";base64")
            .ok_or_else(|| BoothError::InvalidPhoto("payload is not base64".to_string()))?;
        if !mime.starts_with("image/") {
            return Err(BoothError::InvalidPhoto(format!("unsupported type {mime}")));
        }
        let data = STANDARD
            .decode(payload.trim())
            .map_err(|e| BoothError::InvalidPhoto(e.to_string()))?;
        if data.is_empty() {
            return Err(BoothError::InvalidPhoto("empty payload".to_string()));
        }
        Ok(Self::new(position, mime, data))
    }

    /// Encode as a `data:` URI.
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.data))
    }

    pub const fn id(&self) -> SnapshotId {
        self.id
    }

    /// Sequence position within the session.
    pub const fn position(&self) -> usize {
        self.position
    }

    /// The same snapshot moved to `position`.
    #[must_use]
    pub fn at_position(self, position: usize) -> Self {
        Self { position, ..self }
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Shared handle to the encoded bytes.
    pub fn shared_data(&self) -> Arc<[u8]> {
        Arc::clone(&self.data)
    }
}

// === Storage ===

/// Session-scoped key-value storage for small JSON blobs.
pub trait SessionStore {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    fn remove(&mut self, key: &str) -> Result<()>;
}

/// In-memory store, one per process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Store backed by one `<key>.json` file per key in a directory.
///
/// Lets the capture and collage commands of the CLI share a session across
/// separate invocations.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create session directory {}", dir.display()))?;
        debug!(dir = %dir.display(), "Opened session store");
        Ok(Self { dir })
    }

    /// Default location: `<data-local-dir>/booth/session`.
    pub fn default_dir() -> Result<PathBuf> {
        dirs::data_local_dir()
            .map(|d| d.join("booth").join("session"))
            .ok_or_else(|| {
                BoothError::ConfigInvalid("Could not determine local data directory".to_string())
            })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl SessionStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);
        trace!(path = %path.display(), bytes = value.len(), "Writing session entry");
        std::fs::write(&path, value)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        match std::fs::remove_file(self.path_for(key)) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

// === Handoff ===

/// What the capture screen hands to the collage screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Handoff {
    pub photos: Vec<Snapshot>,
    /// `None` when no filter was ever stored.
    pub filter: Option<Filter>,
}

impl Handoff {
    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    /// The stored filter, or `fallback` when the key is absent.
    pub fn filter_or(&self, fallback: Filter) -> Filter {
        self.filter.unwrap_or(fallback)
    }
}

/// Persist the handoff under the two well-known keys.
pub fn write_handoff(store: &mut dyn SessionStore, handoff: &Handoff) -> Result<()> {
    let uris: Vec<String> = handoff.photos.iter().map(Snapshot::to_data_uri).collect();
    let photos = serde_json::to_string(&uris)
        .map_err(|e| BoothError::SessionCorrupt(e.to_string()))?;
    store.set(PHOTOS_KEY, &photos)?;
    // The filter is stored as a bare string, not JSON, like the capture page did.
    match handoff.filter {
        Some(filter) => store.set(FILTER_KEY, filter.css_class())?,
        None => store.remove(FILTER_KEY)?,
    }
    info!(
        photos = handoff.photos.len(),
        filter = handoff.filter.map_or("unset", StyleAxis::id),
        "Session handoff written"
    );
    Ok(())
}

/// Read the handoff, treating anything missing or malformed as empty.
///
/// Individual photos that fail to decode are dropped; the remaining ones keep
/// their relative order and are renumbered from zero.
pub fn read_handoff(store: &dyn SessionStore) -> Handoff {
    let filter = match store.get(FILTER_KEY) {
        Ok(Some(class)) => Some(Filter::from_css_class(&class).unwrap_or_else(|e| {
            warn!(error = %e, "Ignoring unknown stored filter");
            Filter::default()
        })),
        Ok(None) => None,
        Err(e) => {
            warn!(error = %e, "Failed to read stored filter");
            None
        }
    };

    let raw = match store.get(PHOTOS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!("No photos in session");
            return Handoff {
                photos: Vec::new(),
                filter,
            };
        }
        Err(e) => {
            warn!(error = %e, "Failed to read stored photos");
            return Handoff {
                photos: Vec::new(),
                filter,
            };
        }
    };

    let uris: Vec<String> = match serde_json::from_str(&raw) {
        Ok(uris) => uris,
        Err(e) => {
            warn!(error = %e, "Stored photos are not a JSON string array");
            return Handoff {
                photos: Vec::new(),
                filter,
            };
        }
    };

    let photos: Vec<Snapshot> = uris
        .iter()
        .enumerate()
        .filter_map(|(i, uri)| match Snapshot::from_data_uri(i, uri) {
            Ok(s) => Some(s),
            Err(e) => {
                warn!(index = i, error = %e, "Dropping undecodable photo");
                None
            }
        })
        .enumerate()
        .map(|(position, s)| s.at_position(position))
        .collect();

    debug!(
        photos = photos.len(),
        filter = filter.map_or("unset", StyleAxis::id),
        "Session handoff read"
    );
    Handoff { photos, filter }
}
