use dioxus::logger::tracing::debug;
use dioxus::prelude::*;
use tracker_shared::models::{LatLng, PathPoint, RestrictedLocation};
use tracker_shared::path::{coordinates, RouteShape};
use tracker_shared::tooltip::tooltip_label;

use crate::coords::{self, Camera, VIEW_HEIGHT_PX, VIEW_WIDTH_PX};
use crate::icons::{self, MarkerIcon};

const MAP_CONTAINER_ID: &str = "tracker-map-container";

/// Click distance (view-box pixels) within which a marker counts as hit.
const HIT_THRESHOLD: f64 = 16.0;

/// Background grid cells per axis.
const GRID_DIVISIONS: usize = 8;

/// Used before any data has arrived.
const DEFAULT_CENTER: LatLng = LatLng {
    lat: 39.8283,
    lng: -98.5795,
};

/// What a click landed on.
#[derive(Debug, Clone, PartialEq)]
pub enum MapHit {
    Point(String),
    Restricted(String),
}

// ---------------------------------------------------------------------------
// Hit testing
// ---------------------------------------------------------------------------

/// Find the index of the nearest position within `threshold` (Euclidean distance).
fn find_nearest(positions: &[(f64, f64)], click: (f64, f64), threshold: f64) -> Option<usize> {
    let mut best_idx = None;
    let mut best_dist = threshold;
    for (i, pos) in positions.iter().enumerate() {
        let dx = pos.0 - click.0;
        let dy = pos.1 - click.1;
        let dist = (dx * dx + dy * dy).sqrt();
        if dist < best_dist {
            best_dist = dist;
            best_idx = Some(i);
        }
    }
    best_idx
}

/// Resolve a click to a path point first, then a restricted location.
fn hit_test(
    camera: &Camera,
    points: &[PathPoint],
    restricted: &[RestrictedLocation],
    click: (f64, f64),
) -> Option<MapHit> {
    let point_px: Vec<(f64, f64)> = points.iter().map(|p| camera.project(p.lat_lng)).collect();
    if let Some(i) = find_nearest(&point_px, click, HIT_THRESHOLD) {
        return Some(MapHit::Point(points[i].id.clone()));
    }
    let restricted_px: Vec<(f64, f64)> =
        restricted.iter().map(|r| camera.project(r.lat_lng())).collect();
    find_nearest(&restricted_px, click, HIT_THRESHOLD)
        .map(|i| MapHit::Restricted(restricted[i].id.clone()))
}

/// Camera to use when no bounds have been pushed yet.
fn initial_camera(points: &[PathPoint]) -> Camera {
    let center = points.first().map(|p| p.lat_lng).unwrap_or(DEFAULT_CENTER);
    Camera::around(center)
}

// ---------------------------------------------------------------------------
// SVG builder
// ---------------------------------------------------------------------------

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Build the full SVG content as a string for reliable rendering.
fn build_svg_content(
    camera: &Camera,
    points: &[PathPoint],
    restricted: &[RestrictedLocation],
    selected: Option<&str>,
) -> String {
    let mut svg = String::with_capacity(8192);
    build_grid_lines(&mut svg);
    build_restricted_markers(&mut svg, camera, restricted);
    build_route(&mut svg, camera, points);
    build_point_markers(&mut svg, camera, points, selected);
    svg
}

fn build_grid_lines(svg: &mut String) {
    for i in 0..=GRID_DIVISIONS {
        let x = VIEW_WIDTH_PX * i as f64 / GRID_DIVISIONS as f64;
        svg.push_str(&format!(
            r#"<line x1="{x}" y1="0" x2="{x}" y2="{VIEW_HEIGHT_PX}" stroke="rgba(255,255,255,0.08)" stroke-width="1"/>"#
        ));
        let y = VIEW_HEIGHT_PX * i as f64 / GRID_DIVISIONS as f64;
        svg.push_str(&format!(
            r#"<line x1="0" y1="{y}" x2="{VIEW_WIDTH_PX}" y2="{y}" stroke="rgba(255,255,255,0.08)" stroke-width="1"/>"#
        ));
    }
}

/// Polyline through the path. A single point has no line; it is drawn as a
/// lone marker by [`build_point_markers`].
fn build_route(svg: &mut String, camera: &Camera, points: &[PathPoint]) {
    let coords = coordinates(points);
    if RouteShape::of(&coords) != RouteShape::Polyline {
        return;
    }
    let pts: Vec<String> = coords
        .iter()
        .map(|&c| {
            let (x, y) = camera.project(c);
            format!("{x:.2},{y:.2}")
        })
        .collect();
    svg.push_str(&format!(
        r##"<polyline points="{}" fill="none" stroke="#4a8fd4" stroke-width="3" stroke-linejoin="round" stroke-opacity="0.85"/>"##,
        pts.join(" ")
    ));
}

fn marker_title(point: &PathPoint) -> String {
    let time = point.gathered_at.format("%Y-%m-%d %H:%M:%S UTC");
    let kinds = point.warning_kinds();
    if kinds.is_empty() {
        format!("{time}\n{}", coords::format_lat_lng(point.lat_lng))
    } else {
        format!(
            "{time}\n{}\nWarnings: {}",
            coords::format_lat_lng(point.lat_lng),
            kinds.join(", ")
        )
    }
}

/// Index label for a marker: the tooltip policy, plus the selected point.
fn marker_label(index: usize, total: usize, is_selected: bool) -> Option<usize> {
    tooltip_label(index, total).or_else(|| is_selected.then_some(index + 1))
}

fn build_point_markers(
    svg: &mut String,
    camera: &Camera,
    points: &[PathPoint],
    selected: Option<&str>,
) {
    let total = points.len();
    for (i, point) in points.iter().enumerate() {
        let (x, y) = camera.project(point.lat_lng);
        let MarkerIcon { fill, stroke, radius } = icons::marker_icon(point, i, total, selected);
        let title = escape_xml(&marker_title(point));
        svg.push_str(&format!(r#"<g role="img"><title>{title}</title>"#));
        svg.push_str(&format!(
            r#"<circle cx="{x:.2}" cy="{y:.2}" r="{radius}" fill="{fill}" stroke="{stroke}" stroke-width="2"/>"#
        ));
        let is_selected = selected == Some(point.id.as_str());
        if let Some(label) = marker_label(i, total, is_selected) {
            let ty = y - radius - 6.0;
            svg.push_str(&format!(
                r#"<text x="{x:.2}" y="{ty:.2}" fill="white" font-size="13" font-family="sans-serif" font-weight="700" text-anchor="middle" stroke="rgba(0,0,0,0.7)" stroke-width="3" paint-order="stroke">{label}</text>"#
            ));
        }
        svg.push_str("</g>");
    }
}

fn build_restricted_markers(svg: &mut String, camera: &Camera, restricted: &[RestrictedLocation]) {
    let MarkerIcon { fill, stroke, radius } = icons::RESTRICTED;
    for loc in restricted {
        let (x, y) = camera.project(loc.lat_lng());
        let title = escape_xml(&format!("{} ({})", loc.name, loc.restriction_name));
        let side = radius * 2.0;
        let (rx, ry) = (x - radius, y - radius);
        svg.push_str(&format!(
            r#"<g role="img"><title>{title}</title><rect x="{rx:.2}" y="{ry:.2}" width="{side}" height="{side}" fill="{fill}" stroke="{stroke}" stroke-width="2"/></g>"#
        ));
    }
}

#[component]
pub fn MapView(
    points: Vec<PathPoint>,
    restricted: Vec<RestrictedLocation>,
    camera: Option<Camera>,
    selected: Option<String>,
    on_select: EventHandler<String>,
) -> Element {
    // Popup for the restricted location last clicked
    let mut open_popup = use_signal(|| None::<String>);

    let camera = camera.unwrap_or_else(|| initial_camera(&points));
    let svg_content = build_svg_content(&camera, &points, &restricted, selected.as_deref());
    let svg_html = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {VIEW_WIDTH_PX} {VIEW_HEIGHT_PX}" preserveAspectRatio="none" style="position:absolute;top:0;left:0;width:100%;height:100%;pointer-events:none;">{svg_content}</svg>"#
    );

    let popup = open_popup
        .read()
        .as_ref()
        .and_then(|id| restricted.iter().find(|r| &r.id == id))
        .cloned()
        .map(|loc| {
            let (x, y) = camera.project(loc.lat_lng());
            let left = x / VIEW_WIDTH_PX * 100.0;
            let top = y / VIEW_HEIGHT_PX * 100.0;
            (loc, left, top)
        });

    let click_points = points.clone();
    let click_restricted = restricted.clone();

    rsx! {
        div {
            id: MAP_CONTAINER_ID,
            class: "map-container",

            onclick: move |evt: Event<MouseData>| {
                let client = evt.data().client_coordinates();
                let Some(click) = coords::click_to_view_px(client.x, client.y, MAP_CONTAINER_ID) else {
                    return;
                };
                match hit_test(&camera, &click_points, &click_restricted, click) {
                    Some(MapHit::Point(id)) => {
                        open_popup.set(None);
                        on_select.call(id);
                    }
                    Some(MapHit::Restricted(id)) => {
                        let already_open = open_popup.read().as_deref() == Some(id.as_str());
                        open_popup.set(if already_open { None } else { Some(id) });
                    }
                    None => {
                        debug!(at = %coords::format_lat_lng(camera.unproject(click.0, click.1)), "map click missed");
                        open_popup.set(None);
                    }
                }
            },

            div {
                dangerous_inner_html: "{svg_html}",
                style: "position:absolute;top:0;left:0;width:100%;height:100%;pointer-events:none;",
            }

            if points.is_empty() {
                div { class: "map-empty", "No GPS records in this range." }
            }

            if let Some((loc, left, top)) = popup {
                div {
                    class: "map-popup",
                    style: "left: {left}%; top: {top}%;",
                    onclick: move |evt: Event<MouseData>| evt.stop_propagation(),
                    h4 { "{loc.name}" }
                    p { "{loc.address}" }
                    p { class: "restriction", "{loc.restriction_name}" }
                }
            }
        }
    }
}
