use std::collections::BTreeSet;

use crate::models::Event;

/// Active event categories. Empty means "no filter": everything is shown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    active: BTreeSet<String>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.active.contains(label)
    }

    /// Checkbox semantics: checked adds the label, unchecked removes it.
    pub fn toggle(&mut self, label: &str, checked: bool) {
        if checked {
            self.active.insert(label.to_string());
        } else {
            self.active.remove(label);
        }
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.active.iter().map(String::as_str)
    }

    /// Whether an event passes the filter.
    pub fn admits(&self, event: &Event) -> bool {
        self.is_empty() || self.active.contains(&event.kind)
    }

    /// Events passing the filter, in input order.
    pub fn retain_events(&self, events: &[Event]) -> Vec<Event> {
        events.iter().filter(|e| self.admits(e)).cloned().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for FilterSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        FilterSet {
            active: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Distinct event kinds, sorted, for the category checkboxes.
pub fn categories(events: &[Event]) -> Vec<String> {
    events
        .iter()
        .map(|e| e.kind.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Checkbox labels for the filter panel: every category in `events` plus any
/// active label, so an active filter can always be unchecked.
pub fn filter_choices(events: &[Event], filters: &FilterSet) -> Vec<String> {
    events
        .iter()
        .map(|e| e.kind.clone())
        .chain(filters.active.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn event(id: &str, kind: &str) -> Event {
        Event {
            id: id.to_string(),
            kind: kind.to_string(),
            occurred_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            gps_record_id: None,
            description: None,
        }
    }

    #[test]
    fn test_toggle_adds_and_removes() {
        let mut f = FilterSet::new();
        f.toggle("CURFEW", true);
        assert!(f.contains("CURFEW"));
        f.toggle("CURFEW", true);
        assert_eq!(f.labels().count(), 1);
        f.toggle("CURFEW", false);
        assert!(f.is_empty());
        // Unchecking something never checked is a no-op.
        f.toggle("ALCOHOL", false);
        assert!(f.is_empty());
    }

    #[test]
    fn test_empty_filter_admits_everything() {
        let f = FilterSet::new();
        let events = vec![event("1", "A"), event("2", "B")];
        assert_eq!(f.retain_events(&events), events);
    }

    #[test]
    fn test_filter_keeps_only_active_kinds() {
        let f: FilterSet = ["B"].into_iter().collect();
        let events = vec![event("1", "A"), event("2", "B"), event("3", "B")];
        let kept = f.retain_events(&events);
        let ids: Vec<&str> = kept.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3"]);
    }

    #[test]
    fn test_categories_sorted_and_distinct() {
        let events = vec![event("1", "SPEEDING"), event("2", "ALCOHOL"), event("3", "SPEEDING")];
        assert_eq!(categories(&events), vec!["ALCOHOL", "SPEEDING"]);
        assert!(categories(&[]).is_empty());
    }

    #[test]
    fn test_choices_keep_active_label_after_category_disappears() {
        let mut f = FilterSet::new();
        f.toggle("CURFEW", true);
        let events = vec![event("1", "SPEEDING")];
        assert_eq!(categories(&events), vec!["SPEEDING"]);
        assert_eq!(filter_choices(&events, &f), vec!["CURFEW", "SPEEDING"]);
        assert!(f.retain_events(&events).is_empty());

        // Unchecking the stale label restores everything
        f.toggle("CURFEW", false);
        assert_eq!(f.retain_events(&events).len(), 1);
        assert_eq!(filter_choices(&events, &f), vec!["SPEEDING"]);
    }

    #[test]
    fn test_choices_without_events_list_active_labels() {
        let f: FilterSet = ["ALCOHOL"].into_iter().collect();
        assert_eq!(filter_choices(&[], &f), vec!["ALCOHOL"]);
        assert!(filter_choices(&[], &FilterSet::new()).is_empty());
    }
}
