use tracker_shared::models::LatLng;
use tracker_shared::viewport::Bounds;

/// SVG view box of the map surface, in pixels.
pub const VIEW_WIDTH_PX: f64 = 1024.0;
pub const VIEW_HEIGHT_PX: f64 = 640.0;

/// Fraction of the fitted span added on each side.
const FIT_PADDING: f64 = 0.1;
/// Smallest latitude span the camera will show, in degrees.
const MIN_LAT_SPAN: f64 = 0.002;
/// Latitude span used when centering on a single point.
const POINT_LAT_SPAN: f64 = 0.02;

/// What part of the world the map surface shows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub center: LatLng,
    pub lat_span: f64,
}

impl Camera {
    /// Longitude span, keeping the view box aspect ratio.
    pub fn lng_span(&self) -> f64 {
        self.lat_span * VIEW_WIDTH_PX / VIEW_HEIGHT_PX
    }

    /// Camera centered on a point at street-level zoom.
    pub fn around(point: LatLng) -> Self {
        Camera {
            center: point,
            lat_span: POINT_LAT_SPAN,
        }
    }

    /// Smallest padded camera that shows all of `bounds`.
    pub fn fit(bounds: &Bounds) -> Self {
        let aspect = VIEW_WIDTH_PX / VIEW_HEIGHT_PX;
        let lat_span = bounds.lat_span().max(bounds.lng_span() / aspect);
        Camera {
            center: bounds.center(),
            lat_span: (lat_span * (1.0 + 2.0 * FIT_PADDING)).max(MIN_LAT_SPAN),
        }
    }

    /// Project a coordinate to view-box pixels (equirectangular).
    pub fn project(&self, p: LatLng) -> (f64, f64) {
        let west = self.center.lng - self.lng_span() / 2.0;
        let north = self.center.lat + self.lat_span / 2.0;
        (
            (p.lng - west) / self.lng_span() * VIEW_WIDTH_PX,
            (north - p.lat) / self.lat_span * VIEW_HEIGHT_PX,
        )
    }

    /// Inverse of [`Camera::project`].
    pub fn unproject(&self, x: f64, y: f64) -> LatLng {
        let west = self.center.lng - self.lng_span() / 2.0;
        let north = self.center.lat + self.lat_span / 2.0;
        LatLng {
            lat: north - y / VIEW_HEIGHT_PX * self.lat_span,
            lng: west + x / VIEW_WIDTH_PX * self.lng_span(),
        }
    }
}

/// Pure function: convert container-relative coordinates to view-box pixels.
/// The SVG stretches to fill the container (`preserveAspectRatio="none"`).
pub fn container_to_view_px(
    container_x: f64,
    container_y: f64,
    container_w: f64,
    container_h: f64,
) -> Option<(f64, f64)> {
    if container_w <= 0.0 || container_h <= 0.0 {
        return None;
    }
    Some((
        (container_x / container_w * VIEW_WIDTH_PX).clamp(0.0, VIEW_WIDTH_PX),
        (container_y / container_h * VIEW_HEIGHT_PX).clamp(0.0, VIEW_HEIGHT_PX),
    ))
}

/// Get container-relative click coordinates using web_sys, then convert
/// to view-box pixels.
pub fn click_to_view_px(client_x: f64, client_y: f64, container_id: &str) -> Option<(f64, f64)> {
    let document = web_sys::window()?.document()?;
    let element = document.get_element_by_id(container_id)?;
    let rect = element.get_bounding_client_rect();

    container_to_view_px(
        client_x - rect.left(),
        client_y - rect.top(),
        rect.width(),
        rect.height(),
    )
}

/// Format a coordinate for display, 5 decimals (about a meter).
pub fn format_lat_lng(p: LatLng) -> String {
    format!("{:.5}, {:.5}", p.lat, p.lng)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(lat: f64, lng: f64) -> LatLng {
        LatLng { lat, lng }
    }

    #[test]
    fn test_center_projects_to_view_center() {
        let cam = Camera::around(p(40.0, -80.0));
        let (x, y) = cam.project(p(40.0, -80.0));
        assert!((x - VIEW_WIDTH_PX / 2.0).abs() < 1e-9);
        assert!((y - VIEW_HEIGHT_PX / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_north_is_up_east_is_right() {
        let cam = Camera::around(p(40.0, -80.0));
        let (_, y_north) = cam.project(p(40.005, -80.0));
        let (x_east, _) = cam.project(p(40.0, -79.995));
        assert!(y_north < VIEW_HEIGHT_PX / 2.0);
        assert!(x_east > VIEW_WIDTH_PX / 2.0);
    }

    #[test]
    fn test_unproject_inverts_project() {
        let cam = Camera::around(p(40.0, -80.0));
        let q = p(40.003, -80.004);
        let (x, y) = cam.project(q);
        let back = cam.unproject(x, y);
        assert!((back.lat - q.lat).abs() < 1e-9);
        assert!((back.lng - q.lng).abs() < 1e-9);
    }

    #[test]
    fn test_fit_keeps_bounds_inside_view() {
        let bounds = Bounds { south: 40.0, west: -81.0, north: 41.0, east: -80.0 };
        let cam = Camera::fit(&bounds);
        for corner in [p(40.0, -81.0), p(41.0, -80.0), p(40.0, -80.0), p(41.0, -81.0)] {
            let (x, y) = cam.project(corner);
            assert!(x > 0.0 && x < VIEW_WIDTH_PX, "x={x}");
            assert!(y > 0.0 && y < VIEW_HEIGHT_PX, "y={y}");
        }
    }

    #[test]
    fn test_fit_wide_bounds_uses_longitude() {
        // Very wide, very short track: longitude drives the zoom
        let bounds = Bounds { south: 40.0, west: -90.0, north: 40.001, east: -80.0 };
        let cam = Camera::fit(&bounds);
        assert!(cam.lng_span() >= 10.0);
    }

    #[test]
    fn test_fit_degenerate_bounds_has_minimum_span() {
        let bounds = Bounds { south: 40.0, west: -80.0, north: 40.0, east: -80.0 };
        let cam = Camera::fit(&bounds);
        assert!(cam.lat_span >= MIN_LAT_SPAN);
    }

    #[test]
    fn test_container_to_view_px_scales() {
        let (x, y) = container_to_view_px(256.0, 160.0, 512.0, 320.0).unwrap();
        assert!((x - 512.0).abs() < 1e-9);
        assert!((y - 320.0).abs() < 1e-9);
    }

    #[test]
    fn test_container_to_view_px_clamps() {
        let (x, y) = container_to_view_px(-10.0, 9999.0, 512.0, 320.0).unwrap();
        assert_eq!(x, 0.0);
        assert_eq!(y, VIEW_HEIGHT_PX);
    }

    #[test]
    fn test_container_to_view_px_invalid_container() {
        assert!(container_to_view_px(1.0, 1.0, 0.0, 320.0).is_none());
    }

    #[test]
    fn test_format_lat_lng() {
        assert_eq!(format_lat_lng(p(40.123456, -80.5)), "40.12346, -80.50000");
    }
}
