use crate::filter::FilterSet;
use crate::models::{AnnotatedRecord, LatLng, PathPoint};

/// Sort chronologically, drop warning-free points when a filter is active,
/// and project to render-ready points.
///
/// The sort is stable: records sharing a timestamp keep their input order.
pub fn build_path(records: &[AnnotatedRecord], filters: &FilterSet) -> Vec<PathPoint> {
    let mut sorted: Vec<&AnnotatedRecord> = records.iter().collect();
    sorted.sort_by_key(|a| a.record.gathered_at);

    sorted
        .into_iter()
        .filter(|a| filters.is_empty() || a.has_warnings())
        .cloned()
        .map(PathPoint::from)
        .collect()
}

/// Coordinate sequence for the polyline and markers, in path order.
pub fn coordinates(points: &[PathPoint]) -> Vec<LatLng> {
    points.iter().map(|p| p.lat_lng).collect()
}

/// How a coordinate sequence is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RouteShape {
    Empty,
    Marker(LatLng),
    Polyline,
}

impl RouteShape {
    pub fn of(coords: &[LatLng]) -> Self {
        match coords {
            [] => RouteShape::Empty,
            [only] => RouteShape::Marker(*only),
            _ => RouteShape::Polyline,
        }
    }
}
