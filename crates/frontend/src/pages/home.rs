use chrono::{Duration, Utc};
use dioxus::prelude::*;
use tracker_shared::range::DateRange;

use crate::Route;

/// Validate the picker form into a route target.
fn track_target(user_id: &str, from: &str, to: &str) -> Result<Route, String> {
    let user_id = user_id.trim();
    if user_id.is_empty() {
        return Err("Enter a user id".to_string());
    }
    let range = DateRange::parse(from, to)?;
    Ok(Route::track(user_id, &range))
}

#[component]
pub fn Home() -> Element {
    let today = Utc::now().date_naive();
    let mut user_id = use_signal(String::new);
    let mut from = use_signal(move || (today - Duration::days(6)).format("%Y-%m-%d").to_string());
    let mut to = use_signal(move || today.format("%Y-%m-%d").to_string());
    let mut error = use_signal(|| None::<String>);
    let nav = navigator();

    rsx! {
        div { class: "app home",
            div { class: "header",
                h1 { "GPS Tracker" }
            }
            form { class: "panel picker",
                onsubmit: move |evt: Event<FormData>| {
                    evt.prevent_default();
                    match track_target(&user_id.read(), &from.read(), &to.read()) {
                        Ok(route) => {
                            error.set(None);
                            nav.push(route);
                        }
                        Err(e) => error.set(Some(e)),
                    }
                },
                label { "User id"
                    input {
                        r#type: "text",
                        value: "{user_id}",
                        oninput: move |evt: Event<FormData>| user_id.set(evt.value()),
                    }
                }
                label { "From"
                    input {
                        r#type: "date",
                        value: "{from}",
                        oninput: move |evt: Event<FormData>| from.set(evt.value()),
                    }
                }
                label { "To"
                    input {
                        r#type: "date",
                        value: "{to}",
                        oninput: move |evt: Event<FormData>| to.set(evt.value()),
                    }
                }
                button { r#type: "submit", "Show track" }
                if let Some(e) = &*error.read() {
                    p { class: "inline-error", "{e}" }
                }
            }
        }
    }
}
