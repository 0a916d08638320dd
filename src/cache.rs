// ABRCC: Startup Delay and Video Quality of ABR Algorithms under Different Congestion Control
// Copyright (C) 2024-2025 Roland Schmid <roschmi@ethz.ch> and Tibor Schneider <sctibor@ethz.ch>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.
//! On-disk cache of the combined aggregates.
//!
//! Loading and aggregating the session datasets is by far the slowest step, so the result is
//! stored in `<prefix>_<filter mode>.json`. An entry is only reused if it was computed with the
//! same filter mode, the same key derivation and from input files that did not change since
//! (same path, size and modification time). Otherwise it is recomputed and overwritten.

use std::{
    fs,
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
    time::UNIX_EPOCH,
};

use serde::{Deserialize, Serialize};

use crate::{
    aggregate::Aggregates,
    error::{Error, Result},
    filter::FilterMode,
};

/// Identity of an input file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fingerprint {
    pub path: PathBuf,
    pub len: u64,
    /// Modification time as (seconds, nanoseconds) since the epoch, if the platform reports it.
    pub modified: Option<(u64, u32)>,
}

impl Fingerprint {
    pub fn of(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let meta = fs::metadata(path).map_err(|e| Error::Io(path.to_path_buf(), e))?;
        let modified = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| (d.as_secs(), d.subsec_nanos()));
        Ok(Self {
            path: fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf()),
            len: meta.len(),
            modified,
        })
    }
}

/// Everything the cached aggregates depend on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheKey {
    pub filter_mode: FilterMode,
    pub emulation: bool,
    pub inputs: Vec<Fingerprint>,
}

impl CacheKey {
    pub fn new(
        filter_mode: FilterMode,
        emulation: bool,
        inputs: impl IntoIterator<Item = impl AsRef<Path>>,
    ) -> Result<Self> {
        Ok(Self {
            filter_mode,
            emulation,
            inputs: inputs
                .into_iter()
                .map(Fingerprint::of)
                .collect::<Result<_>>()?,
        })
    }
}

#[derive(Serialize, Deserialize)]
struct CacheEntry {
    #[serde(flatten)]
    key: CacheKey,
    #[serde(with = "crate::serde_map")]
    records: Aggregates,
}

#[derive(Clone, Debug)]
pub struct AggregateCache {
    path: PathBuf,
}

impl AggregateCache {
    pub fn new(prefix: impl AsRef<str>, mode: FilterMode) -> Self {
        Self {
            path: PathBuf::from(format!("{}_{mode}.json", prefix.as_ref())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Cached aggregates for `key`, if there are any.
    pub fn load(&self, key: &CacheKey) -> Option<Aggregates> {
        if !self.path.exists() {
            log::debug!("No aggregate cache at {:?}", self.path);
            return None;
        }
        let entry: CacheEntry = match fs::File::open(&self.path)
            .map_err(|e| e.to_string())
            .and_then(|f| serde_json::from_reader(BufReader::new(f)).map_err(|e| e.to_string()))
        {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Ignoring unreadable aggregate cache {:?}: {e}", self.path);
                return None;
            }
        };
        if entry.key != *key {
            log::info!("Aggregate cache {:?} is stale, recomputing", self.path);
            return None;
        }
        log::info!("Using cached aggregates from {:?}", self.path);
        Some(entry.records)
    }

    pub fn store(&self, key: &CacheKey, records: &Aggregates) -> Result<()> {
        let file = fs::File::create(&self.path).map_err(|e| Error::Io(self.path.clone(), e))?;
        let entry = CacheEntry {
            key: key.clone(),
            records: records.clone(),
        };
        let mut w = BufWriter::new(file);
        serde_json::to_writer(&mut w, &entry).map_err(|e| Error::Json(self.path.clone(), e))?;
        w.flush().map_err(|e| Error::Io(self.path.clone(), e))?;
        log::info!("Stored aggregates in {:?}", self.path);
        Ok(())
    }
}
