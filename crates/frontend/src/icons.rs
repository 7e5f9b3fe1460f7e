use tracker_shared::models::PathPoint;

/// Visual style of one map marker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerIcon {
    pub fill: &'static str,
    pub stroke: &'static str,
    pub radius: f64,
}

const PLAIN: MarkerIcon = MarkerIcon {
    fill: "#4a8fd4",
    stroke: "white",
    radius: 6.0,
};

const START: MarkerIcon = MarkerIcon {
    fill: "#5ab882",
    stroke: "white",
    radius: 8.0,
};

const END: MarkerIcon = MarkerIcon {
    fill: "#2d3e50",
    stroke: "white",
    radius: 8.0,
};

const WARNING: MarkerIcon = MarkerIcon {
    fill: "#c43030",
    stroke: "white",
    radius: 8.0,
};

const SELECTED: MarkerIcon = MarkerIcon {
    fill: "#f5c518",
    stroke: "#1a1a1a",
    radius: 11.0,
};

pub const RESTRICTED: MarkerIcon = MarkerIcon {
    fill: "rgba(196,48,48,0.25)",
    stroke: "#c43030",
    radius: 10.0,
};

/// Icon for the path point at `index` of `total`.
///
/// Precedence: selected, then warning, then start/end, then plain.
pub fn marker_icon(
    point: &PathPoint,
    index: usize,
    total: usize,
    selected_id: Option<&str>,
) -> MarkerIcon {
    if selected_id == Some(point.id.as_str()) {
        SELECTED
    } else if point.has_warnings() {
        WARNING
    } else if index == 0 {
        START
    } else if index + 1 == total {
        END
    } else {
        PLAIN
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tracker_shared::models::{LatLng, Warning};

    fn point(id: &str, warned: bool) -> PathPoint {
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
        PathPoint {
            id: id.to_string(),
            lat_lng: LatLng { lat: 0.0, lng: 0.0 },
            gathered_at: at,
            warnings: if warned {
                vec![Warning {
                    event_id: "e".to_string(),
                    kind: "SPEEDING".to_string(),
                    occurred_at: at,
                }]
            } else {
                Vec::new()
            },
        }
    }

    #[test]
    fn test_selected_wins_over_warning() {
        let p = point("a", true);
        assert_eq!(marker_icon(&p, 3, 10, Some("a")), SELECTED);
    }

    #[test]
    fn test_warning_wins_over_start() {
        assert_eq!(marker_icon(&point("a", true), 0, 10, None), WARNING);
    }

    #[test]
    fn test_start_end_and_plain() {
        assert_eq!(marker_icon(&point("a", false), 0, 3, None), START);
        assert_eq!(marker_icon(&point("b", false), 1, 3, Some("zzz")), PLAIN);
        assert_eq!(marker_icon(&point("c", false), 2, 3, None), END);
    }
}
