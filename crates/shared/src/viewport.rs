use serde::{Deserialize, Serialize};

use crate::models::LatLng;

/// Delay before the rendered path is measured, in milliseconds.
pub const SETTLE_DELAY_MS: u32 = 100;

/// Minimal lat/lng rectangle covering a set of points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Bounds {
    /// Bounding box of `points`, or `None` when there are none.
    pub fn enclosing(points: &[LatLng]) -> Option<Bounds> {
        let (first, rest) = points.split_first()?;
        let init = Bounds {
            south: first.lat,
            west: first.lng,
            north: first.lat,
            east: first.lng,
        };
        Some(rest.iter().fold(init, |b, p| Bounds {
            south: b.south.min(p.lat),
            west: b.west.min(p.lng),
            north: b.north.max(p.lat),
            east: b.east.max(p.lng),
        }))
    }

    pub fn contains(&self, p: LatLng) -> bool {
        p.lat >= self.south && p.lat <= self.north && p.lng >= self.west && p.lng <= self.east
    }

    pub fn center(&self) -> LatLng {
        LatLng {
            lat: (self.south + self.north) / 2.0,
            lng: (self.west + self.east) / 2.0,
        }
    }

    pub fn lat_span(&self) -> f64 {
        self.north - self.south
    }

    pub fn lng_span(&self) -> f64 {
        self.east - self.west
    }
}

/// Bounds to fit the camera to. Only set for paths of two or more points.
pub fn viewport_bounds(coords: &[LatLng]) -> Option<Bounds> {
    if coords.len() > 1 {
        Bounds::enclosing(coords)
    } else {
        None
    }
}

/// Identifies one scheduled bounds computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Debounce bookkeeping for the bounds computation.
///
/// Every path change supersedes whatever was pending. A timer that fires with
/// a superseded ticket gets nothing, so a stale path can never overwrite the
/// bounds of a newer one.
#[derive(Debug, Default)]
pub struct ViewportTracker {
    generation: u64,
    pending: Option<(Ticket, Vec<LatLng>)>,
    bounds: Option<Bounds>,
}

impl ViewportTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new coordinate sequence. Returns the ticket to schedule a
    /// settle timer with, or `None` when the path is too short to fit.
    pub fn path_changed(&mut self, coords: &[LatLng]) -> Option<Ticket> {
        self.generation += 1;
        if coords.len() <= 1 {
            self.pending = None;
            self.bounds = None;
            return None;
        }
        let ticket = Ticket(self.generation);
        self.pending = Some((ticket, coords.to_vec()));
        Some(ticket)
    }

    /// Called when a settle timer fires. Yields the new bounds only for the
    /// current ticket.
    pub fn settle(&mut self, ticket: Ticket) -> Option<Bounds> {
        match self.pending.take() {
            Some((current, coords)) if current == ticket => {
                self.bounds = viewport_bounds(&coords);
                self.bounds
            }
            other => {
                self.pending = other;
                None
            }
        }
    }

    /// Drop any pending computation.
    pub fn cancel(&mut self) {
        self.generation += 1;
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(lat: f64, lng: f64) -> LatLng {
        LatLng { lat, lng }
    }

    #[test]
    fn test_enclosing_empty_is_none() {
        assert!(Bounds::enclosing(&[]).is_none());
    }

    #[test]
    fn test_enclosing_covers_all_points() {
        let pts = vec![p(40.0, -80.0), p(41.0, -81.0), p(40.5, -79.5)];
        let b = Bounds::enclosing(&pts).unwrap();
        assert_eq!(b, Bounds { south: 40.0, west: -81.0, north: 41.0, east: -79.5 });
        assert!(pts.iter().all(|&pt| b.contains(pt)));
        assert_eq!(b.center(), p(40.5, -80.25));
    }

    #[test]
    fn test_viewport_bounds_gated_on_length() {
        assert!(viewport_bounds(&[]).is_none());
        assert!(viewport_bounds(&[p(1.0, 1.0)]).is_none());
        assert!(viewport_bounds(&[p(1.0, 1.0), p(2.0, 2.0)]).is_some());
    }

    #[test]
    fn test_tracker_settles_current_ticket() {
        let mut t = ViewportTracker::new();
        let ticket = t.path_changed(&[p(40.0, -80.0), p(41.0, -81.0)]).unwrap();
        assert!(t.bounds().is_none(), "bounds wait for the settle timer");
        let b = t.settle(ticket).unwrap();
        assert!(b.contains(p(40.0, -80.0)));
        assert!(b.contains(p(41.0, -81.0)));
        assert_eq!(t.bounds(), Some(b));
        assert!(!t.is_pending());
    }

    #[test]
    fn test_tracker_ignores_superseded_ticket() {
        let mut t = ViewportTracker::new();
        let old = t.path_changed(&[p(0.0, 0.0), p(1.0, 1.0)]).unwrap();
        let new = t.path_changed(&[p(10.0, 10.0), p(11.0, 11.0)]).unwrap();
        assert!(t.settle(old).is_none());
        assert!(t.is_pending());
        let b = t.settle(new).unwrap();
        assert_eq!(b.south, 10.0);
    }

    #[test]
    fn test_tracker_short_paths_never_set_bounds() {
        let mut t = ViewportTracker::new();
        assert!(t.path_changed(&[]).is_none());
        assert!(t.path_changed(&[p(1.0, 1.0)]).is_none());
        assert!(t.bounds().is_none());
    }

    #[test]
    fn test_tracker_short_path_clears_pending_and_bounds() {
        let mut t = ViewportTracker::new();
        let first = t.path_changed(&[p(0.0, 0.0), p(1.0, 1.0)]).unwrap();
        t.settle(first).unwrap();
        let pending = t.path_changed(&[p(2.0, 2.0), p(3.0, 3.0)]).unwrap();
        assert!(t.path_changed(&[p(5.0, 5.0)]).is_none());
        assert!(t.settle(pending).is_none());
        assert!(t.bounds().is_none());
    }

    #[test]
    fn test_tracker_cancel_drops_pending() {
        let mut t = ViewportTracker::new();
        let ticket = t.path_changed(&[p(0.0, 0.0), p(1.0, 1.0)]).unwrap();
        t.cancel();
        assert!(t.settle(ticket).is_none());
        assert!(t.bounds().is_none());
    }
}
