use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
}

/// One timestamped position sample for a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GpsRecord {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub gathered_at: DateTime<Utc>,
}

impl GpsRecord {
    pub fn lat_lng(&self) -> LatLng {
        LatLng {
            lat: self.latitude,
            lng: self.longitude,
        }
    }
}

/// A categorized occurrence for a user. `kind` is the label the filter panel
/// toggles on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub kind: String,
    pub occurred_at: DateTime<Utc>,
    #[serde(default)]
    pub gps_record_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestrictedLocation {
    pub id: String,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub restriction_name: String,
}

impl RestrictedLocation {
    pub fn lat_lng(&self) -> LatLng {
        LatLng {
            lat: self.latitude,
            lng: self.longitude,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// An event matched to a GPS record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Warning {
    pub event_id: String,
    pub kind: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedRecord {
    pub record: GpsRecord,
    pub warnings: Vec<Warning>,
}

impl AnnotatedRecord {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Render-ready projection of an annotated record.
#[derive(Debug, Clone, PartialEq)]
pub struct PathPoint {
    pub id: String,
    pub lat_lng: LatLng,
    pub gathered_at: DateTime<Utc>,
    pub warnings: Vec<Warning>,
}

impl PathPoint {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Distinct warning kinds in first-seen order.
    pub fn warning_kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = Vec::new();
        for w in &self.warnings {
            if !kinds.contains(&w.kind.as_str()) {
                kinds.push(&w.kind);
            }
        }
        kinds
    }
}

impl From<AnnotatedRecord> for PathPoint {
    fn from(a: AnnotatedRecord) -> Self {
        PathPoint {
            lat_lng: a.record.lat_lng(),
            id: a.record.id,
            gathered_at: a.record.gathered_at,
            warnings: a.warnings,
        }
    }
}
