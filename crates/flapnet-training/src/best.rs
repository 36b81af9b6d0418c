//! Best-ever controller record and its persistence.
//!
//! The record is stored as a single JSON object: the controller layout of
//! [`ControllerModel`] with the score, generation and timestamp alongside.
//!
//! ```json
//! {"version": 1, "hidden": 8, "w1": [...], "b1": [...], "w2": [...], "b2": 0.1,
//!  "score": 42, "generation": 17, "trained_at": "2026-01-01T00:00:00Z"}
//! ```
//!
//! Files holding only the controller layout (no score) load with a score of
//! zero.

use std::{
    fs::{self, File},
    io::{self, BufReader, BufWriter, Write as _},
    path::{Path, PathBuf},
    sync::Mutex,
};

use chrono::{DateTime, Utc};
use flapnet_network::{Controller, ControllerModel};
use serde::{Deserialize, Serialize};

/// The best controller seen so far and how well it did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoredBest", into = "StoredBest")]
pub struct BestRecord {
    pub controller: Controller,
    /// Pipes passed in the generation it was found in.
    pub score: u32,
    pub generation: u64,
    pub trained_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredBest {
    #[serde(flatten)]
    model: ControllerModel,
    #[serde(default)]
    score: u32,
    #[serde(default)]
    generation: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    trained_at: Option<DateTime<Utc>>,
}

impl TryFrom<StoredBest> for BestRecord {
    type Error = flapnet_network::ShapeError;

    fn try_from(stored: StoredBest) -> Result<Self, Self::Error> {
        Ok(Self {
            controller: stored.model.into_controller()?,
            score: stored.score,
            generation: stored.generation,
            trained_at: stored.trained_at,
        })
    }
}

impl From<BestRecord> for StoredBest {
    fn from(record: BestRecord) -> Self {
        Self {
            model: ControllerModel::from_controller(&record.controller),
            score: record.score,
            generation: record.generation,
            trained_at: record.trained_at,
        }
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum StoreError {
    #[display("failed to access {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[display("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Where the best record lives between runs.
pub trait BestStore {
    /// Returns `Ok(None)` when nothing has been stored yet.
    fn load(&self) -> Result<Option<BestRecord>, StoreError>;
    fn save(&self, record: &BestRecord) -> Result<(), StoreError>;
}

impl<S> BestStore for &S
where
    S: BestStore + ?Sized,
{
    fn load(&self) -> Result<Option<BestRecord>, StoreError> {
        (**self).load()
    }

    fn save(&self, record: &BestRecord) -> Result<(), StoreError> {
        (**self).save(record)
    }
}

/// Stores the record as pretty-printed JSON at a fixed path.
///
/// Saving writes a sibling temporary file and renames it over the target, so
/// readers never observe a half-written record.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P>(path: P) -> Self
    where
        P: Into<PathBuf>,
    {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl BestStore for JsonFileStore {
    fn load(&self) -> Result<Option<BestRecord>, StoreError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };
        let record =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| StoreError::Parse {
                path: self.path.clone(),
                source,
            })?;
        Ok(Some(record))
    }

    fn save(&self, record: &BestRecord) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let file = File::create(&tmp).map_err(|e| self.io_error(e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, record).map_err(|e| self.io_error(e.into()))?;
        writer.write_all(b"\n").map_err(|e| self.io_error(e))?;
        writer.flush().map_err(|e| self.io_error(e))?;
        drop(writer);
        fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))?;
        Ok(())
    }
}

/// Keeps the record in memory only.
#[derive(Debug, Default)]
pub struct MemoryStore {
    record: Mutex<Option<BestRecord>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_record(record: BestRecord) -> Self {
        Self {
            record: Mutex::new(Some(record)),
        }
    }

    /// Returns a copy of the stored record.
    #[must_use]
    pub fn get(&self) -> Option<BestRecord> {
        self.record
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl BestStore for MemoryStore {
    fn load(&self) -> Result<Option<BestRecord>, StoreError> {
        Ok(self.get())
    }

    fn save(&self, record: &BestRecord) -> Result<(), StoreError> {
        *self
            .record
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(record.clone());
        Ok(())
    }
}
