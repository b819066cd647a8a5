pub mod duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;

use crate::envelope::Envelope;
use crate::error::{CatalogError, EnvelopeError};
use crate::similarity::CandidateTrack;

/// A track entry as stored in a catalog file. Fields stay loosely typed here;
/// they are validated when a track is turned into a [`CandidateTrack`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackRecord {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_duration_ms: Option<Value>,
    /// Peak envelope: an array of numbers or a string holding one
    #[serde(default, alias = "peakData", skip_serializing_if = "Option::is_none")]
    pub waveform: Option<Value>,
}

impl TrackRecord {
    /// A record for a freshly analyzed file, keyed by its title until
    /// [`Catalog::add_indexed`] settles the final id.
    pub fn indexed(title: &str, duration_ms: f64, envelope: &Envelope) -> Result<Self, CatalogError> {
        Ok(Self {
            id: title.to_string(),
            title: title.to_string(),
            duration: Some(duration::duration_value(duration_ms)),
            raw_duration_ms: None,
            waveform: Some(serde_json::to_value(envelope).map_err(CatalogError::Encode)?),
        })
    }

    /// `duration` when present, else `rawDurationMs`, else `fallback_ms`.
    pub fn duration_ms(&self, fallback_ms: f64) -> f64 {
        let field = if duration::is_present(self.duration.as_ref()) {
            self.duration.as_ref()
        } else {
            self.raw_duration_ms.as_ref()
        };
        duration::parse_duration_ms(field, fallback_ms)
    }

    pub fn envelope(&self) -> Result<Envelope, EnvelopeError> {
        match self.waveform {
            Some(ref value) => Envelope::from_json(value),
            None => Err(EnvelopeError::Empty),
        }
    }

    pub fn to_candidate(&self, fallback_ms: f64) -> Result<CandidateTrack, CatalogError> {
        let envelope = self.envelope().map_err(|source| CatalogError::BadEnvelope {
            id: self.id.clone(),
            source,
        })?;
        Ok(CandidateTrack {
            id: self.id.clone(),
            name: self.title.clone(),
            envelope,
            duration_ms: self.duration_ms(fallback_ms),
        })
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub tracks: Vec<TrackRecord>,
}

impl Catalog {
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog: Catalog =
            serde_json::from_str(&content).map_err(|source| CatalogError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        log::info!("Loaded catalog {} ({} tracks)", path.display(), catalog.tracks.len());
        Ok(catalog)
    }

    pub fn save(&self, path: &Path) -> Result<(), CatalogError> {
        let json = serde_json::to_string_pretty(self).map_err(CatalogError::Encode)?;
        std::fs::write(path, json).map_err(|source| CatalogError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Store a newly indexed record and return the id it ended up under.
    ///
    /// `batch` collects the ids written by the current indexing run. With
    /// `replace`, a track that was in the catalog before the run and shares
    /// the record's id is dropped first. Ids already written by this run are
    /// never replaced: a colliding record gets the next free `-2`, `-3`...
    /// suffix instead.
    pub fn add_indexed(
        &mut self,
        mut record: TrackRecord,
        replace: bool,
        batch: &mut HashSet<String>,
    ) -> String {
        if replace && !batch.contains(&record.id) {
            let before = self.tracks.len();
            self.tracks.retain(|t| t.id != record.id);
            if self.tracks.len() < before {
                log::debug!("Replacing catalog entry '{}'", record.id);
            }
        }

        let id = {
            let taken: HashSet<&str> = self.tracks.iter().map(|t| t.id.as_str()).collect();
            unique_id(&record.id, &taken)
        };
        record.id = id.clone();
        batch.insert(id.clone());
        self.tracks.push(record);
        id
    }

    pub fn find(&self, id: &str) -> Option<&TrackRecord> {
        self.tracks.iter().find(|t| t.id == id)
    }

    /// The reference track as a fully validated descriptor.
    pub fn track(&self, id: &str, fallback_ms: f64) -> Result<CandidateTrack, CatalogError> {
        self.find(id)
            .ok_or_else(|| CatalogError::UnknownTrack(id.to_string()))?
            .to_candidate(fallback_ms)
    }

    /// Every track that can be searched against `reference_id`: the reference
    /// itself and tracks without a valid envelope are left out.
    pub fn candidates_for(&self, reference_id: &str, fallback_ms: f64) -> Vec<CandidateTrack> {
        self.tracks
            .iter()
            .filter(|t| t.id != reference_id)
            .filter_map(|t| match t.to_candidate(fallback_ms) {
                Ok(candidate) => Some(candidate),
                Err(err) => {
                    log::warn!("Skipping track: {}", err);
                    None
                }
            })
            .collect()
    }
}

fn unique_id(base: &str, taken: &HashSet<&str>) -> String {
    if !taken.contains(base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{}-{}", base, n))
        .find(|id| !taken.contains(id.as_str()))
        .unwrap_or_else(|| base.to_string())
}
