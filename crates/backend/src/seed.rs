use serde::Deserialize;
use std::path::Path;
use tracker_shared::models::{Event, GpsRecord, RestrictedLocation};

use crate::storage::Storage;

/// A row tagged with the user it belongs to.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Owned<T> {
    pub user_id: String,
    #[serde(flatten)]
    pub row: T,
}

/// Fixture data loaded from a directory of JSON files.
pub struct Seed {
    pub gps_records: Vec<Owned<GpsRecord>>,
    pub events: Vec<Owned<Event>>,
    pub restricted_locations: Vec<Owned<RestrictedLocation>>,
}

fn read_rows<T: for<'de> Deserialize<'de>>(dir: &Path, file_name: &str) -> Result<Vec<T>, String> {
    let path = dir.join(file_name);
    if !path.exists() {
        return Ok(Vec::new());
    }
    let data = std::fs::read_to_string(&path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    serde_json::from_str(&data).map_err(|e| format!("Failed to parse {}: {}", file_name, e))
}

impl Seed {
    /// Load `gps_records.json`, `events.json` and `restricted_locations.json`.
    /// Missing files count as empty.
    pub fn load(dir: &Path) -> Result<Self, String> {
        Ok(Seed {
            gps_records: read_rows(dir, "gps_records.json")?,
            events: read_rows(dir, "events.json")?,
            restricted_locations: read_rows(dir, "restricted_locations.json")?,
        })
    }

    pub fn apply(&self, storage: &Storage) -> Result<(), String> {
        for r in &self.gps_records {
            storage.save_gps_record(&r.user_id, &r.row)?;
        }
        for e in &self.events {
            storage.save_event(&e.user_id, &e.row)?;
        }
        for l in &self.restricted_locations {
            storage.save_restricted_location(&l.user_id, &l.row)?;
        }
        tracing::info!(
            gps_records = self.gps_records.len(),
            events = self.events.len(),
            restricted_locations = self.restricted_locations.len(),
            "Applied seed data"
        );
        Ok(())
    }
}
