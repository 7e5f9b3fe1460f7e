mod api;
mod components;
mod coords;
mod icons;
mod pages;
mod timer;

use dioxus::prelude::*;
use tracker_shared::models::User;
use tracker_shared::range::DateRange;

#[derive(Routable, Clone, Debug, PartialEq)]
enum Route {
    #[route("/")]
    Home {},
    #[route("/users/:user_id/:from/:to")]
    UserTrack {
        user_id: String,
        from: String,
        to: String,
    },
}

impl Route {
    fn track(user_id: &str, range: &DateRange) -> Self {
        let (from, to) = range.route_parts();
        Route::UserTrack {
            user_id: user_id.to_string(),
            from,
            to,
        }
    }
}

#[component]
fn Home() -> Element {
    rsx! {
        pages::home::Home {}
    }
}

#[component]
fn UserTrack(user_id: String, from: String, to: String) -> Element {
    let range = match DateRange::parse(&from, &to) {
        Ok(range) => range,
        Err(e) => {
            return rsx! {
                div { class: "app",
                    div { class: "error-banner", role: "alert", "{e}" }
                    Link { to: Route::Home {}, "Back" }
                }
            };
        }
    };
    let nav = navigator();
    let caption = match range.days() {
        1 => "1 day".to_string(),
        n => format!("{n} days"),
    };

    rsx! {
        pages::tracker::TrackingView {
            range: range,
            user: User { id: user_id.clone() },
            time_interval: caption,
            on_change_date_range: move |next: DateRange| {
                nav.push(Route::track(&user_id, &next));
            },
        }
    }
}

const CSS: Asset = asset!("/assets/main.css");
const FAVICON: Asset = asset!("/assets/favicon.svg");

#[allow(non_snake_case)]
fn App() -> Element {
    rsx! {
        document::Link { rel: "icon", r#type: "image/svg+xml", href: FAVICON }
        document::Stylesheet { href: CSS }
        Router::<Route> {}
    }
}

fn main() {
    launch(App);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_track_route_displays_as_path() {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 7).unwrap(),
        );
        assert_eq!(Route::track("u1", &range).to_string(), "/users/u1/2024-06-01/2024-06-07");
    }
}
