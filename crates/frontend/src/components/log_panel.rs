use dioxus::prelude::*;
use tracker_shared::models::PathPoint;

use crate::coords;

/// One display row, computed up front so the markup stays flat.
#[derive(Debug, Clone, PartialEq)]
struct LogRow {
    id: String,
    time: String,
    position: String,
    warnings: String,
}

fn log_rows(points: &[PathPoint]) -> Vec<LogRow> {
    points
        .iter()
        .map(|p| LogRow {
            id: p.id.clone(),
            time: p.gathered_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            position: coords::format_lat_lng(p.lat_lng),
            warnings: p.warning_kinds().join(", "),
        })
        .collect()
}

#[component]
pub fn LogPanel(
    points: Vec<PathPoint>,
    selected: Option<String>,
    events_loading: bool,
    events_error: Option<String>,
    on_select: EventHandler<String>,
) -> Element {
    let rows = log_rows(&points);

    rsx! {
        div { class: "panel log-panel",
            h3 { "Log ({rows.len()})" }
            if events_loading {
                div { class: "inline-status", "Loading events..." }
            }
            if let Some(err) = events_error {
                div { class: "inline-error", "Events unavailable: {err}" }
            }
            if rows.is_empty() {
                p { class: "muted", "Nothing to show." }
            }
            ul { class: "log-rows",
                for row in rows {
                    li {
                        key: "{row.id}",
                        class: if selected.as_deref() == Some(row.id.as_str()) { "log-row selected" } else { "log-row" },
                        onclick: {
                            let id = row.id.clone();
                            move |_| on_select.call(id.clone())
                        },
                        span { class: "log-time", "{row.time}" }
                        span { class: "log-pos", "{row.position}" }
                        if !row.warnings.is_empty() {
                            span { class: "log-warn", "{row.warnings}" }
                        }
                    }
                }
            }
        }
    }
}
