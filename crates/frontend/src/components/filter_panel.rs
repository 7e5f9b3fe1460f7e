use dioxus::prelude::*;
use tracker_shared::filter::FilterSet;

#[component]
pub fn FilterPanel(
    categories: Vec<String>,
    filters: FilterSet,
    on_toggle: EventHandler<(String, bool)>,
) -> Element {
    rsx! {
        div { class: "panel filter-panel",
            h3 { "Event Filters" }
            if categories.is_empty() {
                p { class: "muted", "No events in range." }
            }
            for label in categories {
                label {
                    key: "{label}",
                    class: "filter-option",
                    input {
                        r#type: "checkbox",
                        checked: filters.contains(&label),
                        onchange: {
                            let label = label.clone();
                            move |evt: Event<FormData>| on_toggle.call((label.clone(), evt.checked()))
                        },
                    }
                    "{label}"
                }
            }
            if !filters.is_empty() {
                p { class: "muted", "Showing only points with matching warnings." }
            }
        }
    }
}
