use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use chrono::NaiveDate;
use dioxus::logger::tracing::{debug, warn};
use dioxus::prelude::*;
use tracker_shared::correlate::correlate;
use tracker_shared::filter::{filter_choices, FilterSet};
use tracker_shared::models::{Event as TrackEvent, GpsRecord, LatLng, User};
use tracker_shared::path::{build_path, coordinates};
use tracker_shared::range::DateRange;
use tracker_shared::viewport::{Ticket, ViewportTracker, SETTLE_DELAY_MS};

use crate::api;
use crate::components::filter_panel::FilterPanel;
use crate::components::log_panel::LogPanel;
use crate::components::map_view::MapView;
use crate::coords::Camera;
use crate::timer::Debounce;

/// How often GPS records are re-fetched while the view is mounted.
const POLL_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Replace one end of the range from a date input, ignoring unparsable input.
fn edit_range(range: DateRange, value: &str, is_from: bool) -> Option<DateRange> {
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
    Some(if is_from {
        DateRange::new(date, range.to)
    } else {
        DateRange::new(range.from, date)
    })
}

/// What to do with the settle timer after the path changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SettleTimer {
    Schedule(Ticket),
    Cancel,
}

fn plan_settle(tracker: &mut ViewportTracker, coords: &[LatLng]) -> SettleTimer {
    match tracker.path_changed(coords) {
        Some(ticket) => SettleTimer::Schedule(ticket),
        None => SettleTimer::Cancel,
    }
}

/// Runs when a settle timer fires; stale tickets leave the camera alone.
fn settled_camera(tracker: &mut ViewportTracker, ticket: Ticket) -> Option<Camera> {
    let bounds = tracker.settle(ticket)?;
    debug!(?bounds, "viewport settled");
    Some(Camera::fit(&bounds))
}

#[component]
pub fn TrackingView(
    range: ReadSignal<DateRange>,
    user: ReadSignal<User>,
    #[props(default)] time_interval: String,
    on_change_date_range: Option<EventHandler<DateRange>>,
) -> Element {
    // Data resources, re-run whenever the user or range changes
    let mut gps_resource = use_resource(move || {
        let user_id = user.read().id.clone();
        let range = *range.read();
        async move {
            let result = api::fetch_gps_records(&user_id, &range).await;
            if let Err(e) = &result {
                warn!(user = %user_id, "failed to load gps records: {e}");
            }
            result
        }
    });
    let events_resource = use_resource(move || {
        let user_id = user.read().id.clone();
        let range = *range.read();
        async move {
            let result = api::fetch_events(&user_id, &range).await;
            if let Err(e) = &result {
                warn!(user = %user_id, "failed to load events: {e}");
            }
            result
        }
    });
    let restricted_resource = use_resource(move || {
        let user_id = user.read().id.clone();
        async move {
            let result = api::fetch_restricted_locations(&user_id).await;
            if let Err(e) = &result {
                warn!(user = %user_id, "failed to load restricted locations: {e}");
            }
            result
        }
    });

    // Periodic GPS refresh; the task is dropped with the component
    use_future(move || async move {
        loop {
            gloo_timers::future::sleep(POLL_INTERVAL).await;
            debug!("polling gps records");
            gps_resource.restart();
        }
    });

    // UI state
    let mut filters = use_signal(FilterSet::new);
    let mut selected = use_signal(|| None::<String>);
    let mut camera = use_signal(|| None::<Camera>);

    // A different user or range starts with nothing selected
    use_effect(move || {
        let _ = user.read();
        let _ = range.read();
        selected.set(None);
    });

    // Derived state
    let events = use_memo(move || match &*events_resource.read() {
        Some(Ok(events)) => Some(events.clone()),
        _ => None,
    });
    let path = use_memo(move || {
        let records: Vec<GpsRecord> = match &*gps_resource.read() {
            Some(Ok(records)) => records.clone(),
            _ => Vec::new(),
        };
        let filters = filters.read();
        let visible: Option<Vec<TrackEvent>> =
            events.read().as_ref().map(|all| filters.retain_events(all));
        let annotated = correlate(&records, visible.as_deref());
        build_path(&annotated, &filters)
    });
    let coords = use_memo(move || coordinates(&path.read()));

    // Fit the camera once the path has been stable for SETTLE_DELAY_MS
    let tracker = use_hook(|| Rc::new(RefCell::new(ViewportTracker::new())));
    let debounce = use_hook(|| Rc::new(RefCell::new(Debounce::default())));
    use_effect({
        let tracker = tracker.clone();
        let debounce = debounce.clone();
        move || {
            let coords = coords.read();
            let action = plan_settle(&mut tracker.borrow_mut(), &coords);
            match action {
                SettleTimer::Schedule(ticket) => {
                    let tracker = tracker.clone();
                    debounce.borrow_mut().schedule(SETTLE_DELAY_MS, move || {
                        if let Some(fitted) = settled_camera(&mut tracker.borrow_mut(), ticket) {
                            camera.set(Some(fitted));
                        }
                    });
                }
                SettleTimer::Cancel => debounce.borrow_mut().cancel(),
            }
        }
    });
    use_drop({
        let tracker = tracker.clone();
        let debounce = debounce.clone();
        move || {
            debounce.borrow_mut().cancel();
            tracker.borrow_mut().cancel();
        }
    });

    // Render inputs
    let loading = gps_resource.read().is_none() || restricted_resource.read().is_none();
    let mut banner: Vec<String> = Vec::new();
    if let Some(Err(e)) = &*gps_resource.read() {
        banner.push(format!("Could not load GPS records: {e}"));
    }
    if let Some(Err(e)) = &*restricted_resource.read() {
        banner.push(format!("Could not load restricted locations: {e}"));
    }
    let events_loading = events_resource.read().is_none();
    let events_error = match &*events_resource.read() {
        Some(Err(e)) => Some(e.clone()),
        _ => None,
    };
    let restricted = match &*restricted_resource.read() {
        Some(Ok(rows)) => rows.clone(),
        _ => Vec::new(),
    };
    let event_categories = filter_choices(events.read().as_deref().unwrap_or_default(), &filters.read());

    let current = *range.read();
    let (from, to) = current.route_parts();
    let user_id = user.read().id.clone();
    let editable = on_change_date_range.is_some();

    let select_point = move |id: String| selected.set(Some(id));

    rsx! {
        div { class: "app",
            div { class: "header",
                h1 { "GPS Tracker" }
                span { class: "user-id", "User {user_id}" }
                if !time_interval.is_empty() {
                    span { class: "caption", "{time_interval}" }
                }
                div { class: "date-range",
                    input {
                        r#type: "date",
                        "aria-label": "From date",
                        value: "{from}",
                        disabled: !editable,
                        onchange: move |evt: Event<FormData>| {
                            if let (Some(handler), Some(next)) = (on_change_date_range, edit_range(current, &evt.value(), true)) {
                                handler.call(next);
                            }
                        },
                    }
                    span { "to" }
                    input {
                        r#type: "date",
                        "aria-label": "To date",
                        value: "{to}",
                        disabled: !editable,
                        onchange: move |evt: Event<FormData>| {
                            if let (Some(handler), Some(next)) = (on_change_date_range, edit_range(current, &evt.value(), false)) {
                                handler.call(next);
                            }
                        },
                    }
                }
            }

            for message in banner {
                div { class: "error-banner", role: "alert", "{message}" }
            }

            if loading {
                div { class: "loader",
                    div { class: "spinner" }
                    "Loading track..."
                }
            } else {
                div { class: "sidebar",
                    FilterPanel {
                        categories: event_categories,
                        filters: filters.read().clone(),
                        on_toggle: move |(label, checked): (String, bool)| {
                            filters.write().toggle(&label, checked);
                        },
                    }
                    LogPanel {
                        points: path.read().clone(),
                        selected: selected.read().clone(),
                        events_loading: events_loading,
                        events_error: events_error,
                        on_select: select_point,
                    }
                }
                MapView {
                    points: path.read().clone(),
                    restricted: restricted,
                    camera: *camera.read(),
                    selected: selected.read().clone(),
                    on_select: select_point,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_edit_range_from_and_to() {
        let range = DateRange::new(d(2024, 6, 1), d(2024, 6, 7));
        assert_eq!(
            edit_range(range, "2024-05-30", true),
            Some(DateRange::new(d(2024, 5, 30), d(2024, 6, 7)))
        );
        assert_eq!(
            edit_range(range, "2024-06-10", false),
            Some(DateRange::new(d(2024, 6, 1), d(2024, 6, 10)))
        );
    }

    #[test]
    fn test_edit_range_reversed_is_normalized() {
        let range = DateRange::new(d(2024, 6, 1), d(2024, 6, 7));
        let next = edit_range(range, "2024-06-20", true).unwrap();
        assert_eq!(next.from, d(2024, 6, 7));
        assert_eq!(next.to, d(2024, 6, 20));
    }

    #[test]
    fn test_edit_range_ignores_garbage() {
        let range = DateRange::new(d(2024, 6, 1), d(2024, 6, 7));
        assert_eq!(edit_range(range, "", true), None);
    }

    fn p(lat: f64, lng: f64) -> LatLng {
        LatLng { lat, lng }
    }

    fn ticket_of(action: SettleTimer) -> Ticket {
        match action {
            SettleTimer::Schedule(ticket) => ticket,
            SettleTimer::Cancel => panic!("expected a scheduled timer"),
        }
    }

    #[test]
    fn test_only_latest_path_moves_camera() {
        let mut tracker = ViewportTracker::new();
        let first = ticket_of(plan_settle(&mut tracker, &[p(10.0, 10.0), p(11.0, 11.0)]));
        let second = ticket_of(plan_settle(&mut tracker, &[p(40.0, -80.0), p(40.01, -80.01)]));

        // The replaced timer firing late does nothing
        assert_eq!(settled_camera(&mut tracker, first), None);

        let camera = settled_camera(&mut tracker, second).unwrap();
        assert!((camera.center.lat - 40.005).abs() < 1e-9);
        assert!((camera.center.lng + 80.005).abs() < 1e-9);

        // A ticket settles once
        assert_eq!(settled_camera(&mut tracker, second), None);
    }

    #[test]
    fn test_short_path_cancels_pending_timer() {
        let mut tracker = ViewportTracker::new();
        let pending = ticket_of(plan_settle(&mut tracker, &[p(1.0, 1.0), p(2.0, 2.0)]));
        assert_eq!(plan_settle(&mut tracker, &[p(3.0, 3.0)]), SettleTimer::Cancel);
        assert_eq!(plan_settle(&mut tracker, &[]), SettleTimer::Cancel);
        assert_eq!(settled_camera(&mut tracker, pending), None);
        assert!(!tracker.is_pending());
    }

    #[test]
    fn test_poll_interval_is_ten_minutes() {
        assert_eq!(POLL_INTERVAL.as_secs(), 600);
    }
}
