//! JDOM persistence.
//!
//! Stores are idempotent by source URL: saving a JDOM whose URL is already
//! stored is a no-op that reports the existing record. JDOMs without a URL
//! have no key and are always inserted.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::jdom::Jdom;

/// Result of [`JdomStore::save`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Inserted(u64),
    /// A record with the same URL already existed; nothing was written.
    AlreadyStored(u64),
}

impl SaveOutcome {
    pub fn id(self) -> u64 {
        match self {
            SaveOutcome::Inserted(id) | SaveOutcome::AlreadyStored(id) => id,
        }
    }

    pub fn is_inserted(self) -> bool {
        matches!(self, SaveOutcome::Inserted(_))
    }
}

/// A persisted JDOM and its store-assigned id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredJdom {
    pub id: u64,
    #[serde(flatten)]
    pub jdom: Jdom,
}

/// Persistence seam for converted documents.
pub trait JdomStore {
    /// Insert `jdom` unless a record with the same URL exists.
    fn save(&mut self, jdom: &Jdom) -> Result<SaveOutcome>;

    /// The earliest inserted record, if any.
    fn get_default(&self) -> Result<Option<StoredJdom>>;
}

/// Records plus the next id. Shared by both stores.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Records {
    next_id: u64,
    records: Vec<StoredJdom>,
}

impl Records {
    fn find_by_url(&self, url: &str) -> Option<&StoredJdom> {
        self.records.iter().find(|r| r.jdom.url() == Some(url))
    }

    fn save(&mut self, jdom: &Jdom) -> SaveOutcome {
        if let Some(url) = jdom.url()
            && let Some(existing) = self.find_by_url(url)
        {
            tracing::debug!(url, id = existing.id, "jdom already stored");
            return SaveOutcome::AlreadyStored(existing.id);
        }

        let id = self.next_id;
        self.next_id += 1;
        self.records.push(StoredJdom {
            id,
            jdom: jdom.clone(),
        });
        tracing::debug!(url = jdom.url(), id, "stored jdom");
        SaveOutcome::Inserted(id)
    }

    fn first(&self) -> Option<StoredJdom> {
        self.records.first().cloned()
    }
}

/// In-process store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Records,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.records.is_empty()
    }
}

impl JdomStore for MemoryStore {
    fn save(&mut self, jdom: &Jdom) -> Result<SaveOutcome> {
        Ok(self.inner.save(jdom))
    }

    fn get_default(&self) -> Result<Option<StoredJdom>> {
        Ok(self.inner.first())
    }
}

/// Store backed by a single JSON file, rewritten on every insert.
///
/// A missing file is an empty store; the file is created on first insert.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    inner: Records,
}

impl FileStore {
    /// Open the store at `path`, loading existing records.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let inner = read_records(&path)?;
        tracing::debug!(
            path = %path.display(),
            records = inner.records.len(),
            "opened jdom store"
        );
        Ok(Self { path, inner })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.inner.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.records.is_empty()
    }
}

impl JdomStore for FileStore {
    fn save(&mut self, jdom: &Jdom) -> Result<SaveOutcome> {
        let mut next = self.inner.clone();
        let outcome = next.save(jdom);
        if outcome.is_inserted() {
            write_records(&self.path, &next)?;
            self.inner = next;
        }
        Ok(outcome)
    }

    fn get_default(&self) -> Result<Option<StoredJdom>> {
        Ok(self.inner.first())
    }
}

fn read_records(path: &Path) -> Result<Records> {
    if !path.exists() {
        return Ok(Records::default());
    }

    let content = fs::read_to_string(path).map_err(|error| {
        Error::Store(format!(
            "failed reading store file `{}`: {error}",
            path.display()
        ))
    })?;
    serde_json::from_str(&content).map_err(|error| {
        Error::Store(format!(
            "failed parsing store file `{}`: {error}",
            path.display()
        ))
    })
}

fn write_records(path: &Path, records: &Records) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|error| {
            Error::Store(format!(
                "failed creating store directory `{}`: {error}",
                parent.display()
            ))
        })?;
    }

    let content = serde_json::to_string_pretty(records)?;
    fs::write(path, content).map_err(|error| {
        Error::Store(format!(
            "failed writing store file `{}`: {error}",
            path.display()
        ))
    })
}
