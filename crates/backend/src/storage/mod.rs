use chrono::{DateTime, Utc};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracker_shared::models::{Event, GpsRecord, RestrictedLocation};

/// String keys to JSON-encoded rows.
type JsonTable = TableDefinition<'static, &'static str, &'static [u8]>;

const GPS_RECORDS_TABLE: JsonTable = TableDefinition::new("gps_records");
const EVENTS_TABLE: JsonTable = TableDefinition::new("events");
const RESTRICTED_TABLE: JsonTable = TableDefinition::new("restricted_locations");

/// Separates key segments; sorts below every printable character.
const SEP: char = '\u{1f}';

/// Time-ordered key: `user SEP time SEP id`. The timestamp has its sign bit
/// flipped so lexical order matches chronological order.
fn timed_key(user_id: &str, at: DateTime<Utc>, id: &str) -> String {
    format!("{user_id}{SEP}{}{SEP}{id}", time_segment(at))
}

fn time_segment(at: DateTime<Utc>) -> String {
    format!("{:020}", (at.timestamp_millis() as u64) ^ (1u64 << 63))
}

fn user_prefix(user_id: &str) -> String {
    format!("{user_id}{SEP}")
}

pub struct Storage {
    db: Database,
}

impl Storage {
    pub fn open(path: &Path) -> Result<Arc<Self>, String> {
        let db = Database::create(path)
            .map_err(|e| format!("Failed to open database at {}: {}", path.display(), e))?;

        // Ensure tables exist so read transactions never hit a missing table
        let write_txn = db.begin_write().map_err(|e| e.to_string())?;
        for table in [GPS_RECORDS_TABLE, EVENTS_TABLE, RESTRICTED_TABLE] {
            write_txn.open_table(table).map_err(|e| e.to_string())?;
        }
        write_txn.commit().map_err(|e| e.to_string())?;

        Ok(Arc::new(Storage { db }))
    }

    fn put<T: Serialize>(
        &self,
        table_def: JsonTable,
        key: &str,
        value: &T,
    ) -> Result<(), String> {
        let json = serde_json::to_vec(value).map_err(|e| e.to_string())?;
        let write_txn = self.db.begin_write().map_err(|e| e.to_string())?;
        {
            let mut table = write_txn.open_table(table_def).map_err(|e| e.to_string())?;
            table
                .insert(key, json.as_slice())
                .map_err(|e| e.to_string())?;
        }
        write_txn.commit().map_err(|e| e.to_string())?;
        Ok(())
    }

    /// All values with keys in `[lower, upper]`, in key order.
    fn scan<T: DeserializeOwned>(
        &self,
        table_def: JsonTable,
        lower: &str,
        upper: &str,
    ) -> Result<Vec<T>, String> {
        if lower > upper {
            return Ok(Vec::new());
        }
        let read_txn = self.db.begin_read().map_err(|e| e.to_string())?;
        let table = read_txn.open_table(table_def).map_err(|e| e.to_string())?;

        let mut rows = Vec::new();
        for entry in table.range(lower..=upper).map_err(|e| e.to_string())? {
            let (_, value) = entry.map_err(|e| e.to_string())?;
            rows.push(serde_json::from_slice(value.value()).map_err(|e| e.to_string())?);
        }
        Ok(rows)
    }

    fn scan_window<T: DeserializeOwned>(
        &self,
        table_def: JsonTable,
        user_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<T>, String> {
        let lower = format!("{}{}", user_prefix(user_id), time_segment(from));
        let upper = format!("{}{}{SEP}{}", user_prefix(user_id), time_segment(to), char::MAX);
        self.scan(table_def, &lower, &upper)
    }

    pub fn save_gps_record(&self, user_id: &str, record: &GpsRecord) -> Result<(), String> {
        let key = timed_key(user_id, record.gathered_at, &record.id);
        self.put(GPS_RECORDS_TABLE, &key, record)
    }

    pub fn save_event(&self, user_id: &str, event: &Event) -> Result<(), String> {
        let key = timed_key(user_id, event.occurred_at, &event.id);
        self.put(EVENTS_TABLE, &key, event)
    }

    pub fn save_restricted_location(
        &self,
        user_id: &str,
        location: &RestrictedLocation,
    ) -> Result<(), String> {
        let key = format!("{}{}", user_prefix(user_id), location.id);
        self.put(RESTRICTED_TABLE, &key, location)
    }

    /// GPS records gathered within `[from, to]`, oldest first.
    pub fn gps_records(
        &self,
        user_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<GpsRecord>, String> {
        self.scan_window(GPS_RECORDS_TABLE, user_id, from, to)
    }

    /// Events that occurred within `[from, to]`, oldest first.
    pub fn events(
        &self,
        user_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Event>, String> {
        self.scan_window(EVENTS_TABLE, user_id, from, to)
    }

    pub fn restricted_locations(&self, user_id: &str) -> Result<Vec<RestrictedLocation>, String> {
        let lower = user_prefix(user_id);
        let upper = format!("{lower}{}", char::MAX);
        self.scan(RESTRICTED_TABLE, &lower, &upper)
    }
}
