use chrono::Duration;

use crate::models::{AnnotatedRecord, Event, GpsRecord, Warning};

/// Maximum gap, in seconds, between an event and a GPS sample for a
/// time-based match.
pub const CORRELATION_WINDOW_SECS: i64 = 5 * 60;

/// Annotate every record with the events that match it.
///
/// Output has one entry per input record, in input order. An event carrying a
/// `gps_record_id` attaches to that record; otherwise it attaches to the single
/// record nearest in time, within [`CORRELATION_WINDOW_SECS`]. Ties go to the
/// earliest record in input order. Unmatched events are dropped.
pub fn correlate(records: &[GpsRecord], events: Option<&[Event]>) -> Vec<AnnotatedRecord> {
    let mut warnings: Vec<Vec<(usize, Warning)>> = vec![Vec::new(); records.len()];

    for (event_idx, event) in events.unwrap_or_default().iter().enumerate() {
        if let Some(target) = match_event(records, event) {
            warnings[target].push((
                event_idx,
                Warning {
                    event_id: event.id.clone(),
                    kind: event.kind.clone(),
                    occurred_at: event.occurred_at,
                },
            ));
        }
    }

    records
        .iter()
        .zip(warnings)
        .map(|(record, mut matched)| {
            matched.sort_by(|a, b| a.1.occurred_at.cmp(&b.1.occurred_at).then(a.0.cmp(&b.0)));
            AnnotatedRecord {
                record: record.clone(),
                warnings: matched.into_iter().map(|(_, w)| w).collect(),
            }
        })
        .collect()
}

/// Index of the record an event belongs to, if any.
fn match_event(records: &[GpsRecord], event: &Event) -> Option<usize> {
    if let Some(record_id) = &event.gps_record_id {
        return records.iter().position(|r| &r.id == record_id);
    }

    let window = Duration::seconds(CORRELATION_WINDOW_SECS);
    let mut best: Option<(usize, Duration)> = None;
    for (i, record) in records.iter().enumerate() {
        let gap = (record.gathered_at - event.occurred_at).abs();
        if gap > window {
            continue;
        }
        match best {
            Some((_, best_gap)) if gap >= best_gap => {}
            _ => best = Some((i, gap)),
        }
    }
    best.map(|(i, _)| i)
}
